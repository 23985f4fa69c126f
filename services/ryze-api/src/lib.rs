//! RYZE 平台 API
//!
//! 需求发布、开发者对接、会话协商与运维手册执行

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
