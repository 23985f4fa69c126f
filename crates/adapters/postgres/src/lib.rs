//! ryze-adapter-postgres - PostgreSQL 适配器
//!
//! 连接池、健康检查、迁移管理与错误映射

mod connection;
mod error;
mod health;
mod migration;

pub use connection::*;
pub use error::*;
pub use health::*;
pub use migration::*;
