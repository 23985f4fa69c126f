//! 用户 Repository trait

use async_trait::async_trait;
use ryze_common::UserId;
use ryze_errors::AppResult;

use crate::domain::entities::User;
use crate::domain::value_objects::{Email, Username};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 根据 ID 查找用户
    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<User>>;

    /// 根据用户名查找用户
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// 批量查找
    async fn find_by_ids(&self, ids: &[UserId]) -> AppResult<Vec<User>>;

    /// 保存用户
    async fn save(&self, user: &User) -> AppResult<()>;

    /// 检查用户名是否存在
    async fn exists_by_username(&self, username: &Username) -> AppResult<bool>;

    /// 检查邮箱是否存在
    async fn exists_by_email(&self, email: &Email) -> AppResult<bool>;

    /// 用户名包含 `query`（不区分大小写）的用户，排除 `exclude`
    async fn search_by_username(
        &self,
        query: &str,
        exclude: &UserId,
        limit: i64,
    ) -> AppResult<Vec<User>>;
}
