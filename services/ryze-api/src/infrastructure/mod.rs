//! 基础设施层：持久化、迁移与命令执行

pub mod executor;
pub mod migrations;
pub mod persistence;
