//! PostgreSQL 仓储实现

mod postgres_comment_repository;
mod postgres_conversation_repository;
mod postgres_feedback_repository;
mod postgres_profile_repository;
mod postgres_project_repository;
mod postgres_rating_repository;
mod postgres_request_repository;
mod postgres_runbook_repository;
mod postgres_snag_repository;
mod postgres_user_repository;

pub use postgres_comment_repository::PostgresCommentRepository;
pub use postgres_conversation_repository::PostgresConversationRepository;
pub use postgres_feedback_repository::PostgresFeedbackRepository;
pub use postgres_profile_repository::PostgresProfileRepository;
pub use postgres_project_repository::PostgresProjectRepository;
pub use postgres_rating_repository::PostgresRatingRepository;
pub use postgres_request_repository::PostgresRequestRepository;
pub use postgres_runbook_repository::PostgresRunbookRepository;
pub use postgres_snag_repository::PostgresSnagRepository;
pub use postgres_user_repository::PostgresUserRepository;
