//! 抢单 Repository trait

use async_trait::async_trait;
use ryze_common::{RequestId, UserId};
use ryze_errors::AppResult;

use crate::domain::entities::SnaggedRequest;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnagRepository: Send + Sync {
    /// 不区分是否有效
    async fn find(
        &self,
        request_id: &RequestId,
        developer_id: &UserId,
    ) -> AppResult<Option<SnaggedRequest>>;

    async fn save(&self, snag: &SnaggedRequest) -> AppResult<()>;

    async fn update(&self, snag: &SnaggedRequest) -> AppResult<()>;

    async fn list_active_by_developer(&self, developer_id: &UserId)
    -> AppResult<Vec<SnaggedRequest>>;
}
