//! 评分 Repository trait

use async_trait::async_trait;
use ryze_common::UserId;
use ryze_errors::AppResult;

use crate::domain::entities::DeveloperRating;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RatingRepository: Send + Sync {
    async fn find(&self, developer: &UserId, rater: &UserId) -> AppResult<Option<DeveloperRating>>;

    async fn save(&self, rating: &DeveloperRating) -> AppResult<()>;

    async fn update(&self, rating: &DeveloperRating) -> AppResult<()>;

    async fn list_by_developer(&self, developer: &UserId) -> AppResult<Vec<DeveloperRating>>;
}
