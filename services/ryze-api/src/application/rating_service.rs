//! 开发者评分

use std::sync::Arc;

use ryze_common::UserId;
use ryze_errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::entities::{DeveloperRating, RatingSummary};
use crate::domain::repositories::{ProfileRepository, RatingRepository};

#[derive(Debug, Clone, Deserialize)]
pub struct RateDeveloper {
    pub stars: i16,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateOut {
    pub success: bool,
    pub average_rating: f64,
    pub total_ratings: usize,
    pub message: String,
}

pub struct RatingService {
    ratings: Arc<dyn RatingRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl RatingService {
    pub fn new(ratings: Arc<dyn RatingRepository>, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { ratings, profiles }
    }

    /// 每个评分人对同一开发者只保留一条评分，写入后重算资料上的平均分
    pub async fn rate(
        &self,
        developer_id: &UserId,
        rater: &UserId,
        input: RateDeveloper,
    ) -> AppResult<RateOut> {
        if developer_id == rater {
            return Err(AppError::validation("You cannot rate yourself"));
        }
        let mut profile = self
            .profiles
            .find_developer(developer_id)
            .await?
            .ok_or_else(|| AppError::not_found("Developer profile not found"))?;

        let updated = match self.ratings.find(developer_id, rater).await? {
            Some(mut existing) => {
                existing.revise(input.stars, input.comment)?;
                self.ratings.update(&existing).await?;
                true
            }
            None => {
                let rating = DeveloperRating::new(*developer_id, *rater, input.stars, input.comment)?;
                self.ratings.save(&rating).await?;
                false
            }
        };

        let summary = self.summary(developer_id).await?;
        profile.rating = Some(summary.average_rating);
        self.profiles.update_developer(&profile).await?;

        info!(developer_id = %developer_id, updated, "Developer rated");
        Ok(RateOut {
            success: true,
            average_rating: summary.average_rating,
            total_ratings: summary.total_ratings,
            message: if updated {
                "Rating updated successfully".to_string()
            } else {
                "Rating added successfully".to_string()
            },
        })
    }

    pub async fn summary(&self, developer_id: &UserId) -> AppResult<RatingSummary> {
        let ratings = self.ratings.list_by_developer(developer_id).await?;
        Ok(RatingSummary::from_ratings(&ratings))
    }

    pub async fn user_rating(
        &self,
        developer_id: &UserId,
        rater: &UserId,
    ) -> AppResult<Option<DeveloperRating>> {
        self.ratings.find(developer_id, rater).await
    }
}
