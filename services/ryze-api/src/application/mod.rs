//! 应用层：用例编排

pub mod account_service;
pub mod comment_service;
pub mod conversation_service;
pub mod dto;
pub mod feedback_service;
pub mod profile_service;
pub mod project_service;
pub mod rating_service;
pub mod request_service;
pub mod runbook_service;
pub mod snag_service;

pub use account_service::AccountService;
pub use comment_service::CommentService;
pub use conversation_service::ConversationService;
pub use feedback_service::FeedbackService;
pub use profile_service::ProfileService;
pub use project_service::ProjectService;
pub use rating_service::RatingService;
pub use request_service::RequestService;
pub use runbook_service::RunbookService;
pub use snag_service::SnagService;
