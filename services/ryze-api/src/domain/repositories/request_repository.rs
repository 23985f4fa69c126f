//! 需求 Repository trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ryze_common::{Pagination, ProjectId, RequestId, UserId};
use ryze_errors::AppResult;

use crate::domain::entities::{Request, RequestShare};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestRepository: Send + Sync {
    async fn find_by_id(&self, id: &RequestId) -> AppResult<Option<Request>>;

    async fn save(&self, request: &Request) -> AppResult<()>;

    async fn update(&self, request: &Request) -> AppResult<()>;

    async fn delete(&self, id: &RequestId) -> AppResult<()>;

    /// 用户自己的需求，可按项目过滤（按创建时间倒序）
    async fn list_by_owner(
        &self,
        owner: &UserId,
        project_id: Option<ProjectId>,
    ) -> AppResult<Vec<Request>>;

    /// 项目下的全部需求
    async fn list_by_project(&self, project_id: &ProjectId) -> AppResult<Vec<Request>>;

    /// 公开需求（按创建时间倒序）
    async fn list_public(&self, page: Pagination) -> AppResult<Vec<Request>>;

    /// 共享给该用户的需求
    async fn list_shared_with(&self, user_id: &UserId) -> AppResult<Vec<Request>>;

    async fn find_share(
        &self,
        request_id: &RequestId,
        user_id: &UserId,
    ) -> AppResult<Option<RequestShare>>;

    async fn list_shares(&self, request_id: &RequestId) -> AppResult<Vec<RequestShare>>;

    async fn save_share(&self, share: &RequestShare) -> AppResult<()>;

    /// 返回是否删除了记录
    async fn delete_share(&self, request_id: &RequestId, user_id: &UserId) -> AppResult<bool>;

    /// 仅在首次查看时写入 viewed_at
    async fn mark_share_viewed(
        &self,
        request_id: &RequestId,
        user_id: &UserId,
        viewed_at: DateTime<Utc>,
    ) -> AppResult<()>;
}
