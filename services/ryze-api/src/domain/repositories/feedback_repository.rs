//! 反馈 Repository trait

use async_trait::async_trait;
use ryze_errors::AppResult;

use crate::domain::entities::Feedback;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    async fn save(&self, feedback: &Feedback) -> AppResult<()>;

    /// 按创建时间倒序
    async fn list_all(&self) -> AppResult<Vec<Feedback>>;
}
