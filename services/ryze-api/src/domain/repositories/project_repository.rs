//! 项目 Repository trait

use async_trait::async_trait;
use ryze_common::{ProjectId, UserId};
use ryze_errors::AppResult;

use crate::domain::entities::Project;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn find_by_id(&self, id: &ProjectId) -> AppResult<Option<Project>>;

    /// 用户的全部项目（按创建时间倒序）
    async fn list_by_owner(&self, owner: &UserId) -> AppResult<Vec<Project>>;

    async fn save(&self, project: &Project) -> AppResult<()>;

    async fn update(&self, project: &Project) -> AppResult<()>;

    async fn delete(&self, id: &ProjectId) -> AppResult<()>;
}
