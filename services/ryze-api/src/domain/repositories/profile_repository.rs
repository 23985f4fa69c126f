//! 资料 Repository trait

use async_trait::async_trait;
use ryze_common::{Pagination, UserId};
use ryze_errors::AppResult;

use crate::domain::entities::{ClientProfile, DeveloperProfile};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_developer(&self, user_id: &UserId) -> AppResult<Option<DeveloperProfile>>;

    async fn save_developer(&self, profile: &DeveloperProfile) -> AppResult<()>;

    async fn update_developer(&self, profile: &DeveloperProfile) -> AppResult<()>;

    /// 公开的开发者资料（按创建时间倒序）
    async fn list_public_developers(&self, page: Pagination) -> AppResult<Vec<DeveloperProfile>>;

    async fn find_client(&self, user_id: &UserId) -> AppResult<Option<ClientProfile>>;

    async fn save_client(&self, profile: &ClientProfile) -> AppResult<()>;

    async fn update_client(&self, profile: &ClientProfile) -> AppResult<()>;
}
