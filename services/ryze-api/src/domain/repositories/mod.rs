//! 仓储接口

mod comment_repository;
mod conversation_repository;
mod feedback_repository;
mod profile_repository;
mod project_repository;
mod rating_repository;
mod request_repository;
mod runbook_repository;
mod snag_repository;
mod user_repository;

pub use comment_repository::*;
pub use conversation_repository::*;
pub use feedback_repository::*;
pub use profile_repository::*;
pub use project_repository::*;
pub use rating_repository::*;
pub use request_repository::*;
pub use runbook_repository::*;
pub use snag_repository::*;
pub use user_repository::*;
