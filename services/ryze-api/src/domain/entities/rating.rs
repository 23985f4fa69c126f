//! 开发者评分

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use ryze_common::{RatingId, UserId};
use ryze_errors::AppError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeveloperRating {
    pub id: RatingId,
    pub developer_user_id: UserId,
    pub user_id: UserId,
    pub stars: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// 1..=5 星校验
pub fn validate_stars(stars: i16) -> Result<i16, AppError> {
    if (1..=5).contains(&stars) {
        Ok(stars)
    } else {
        Err(AppError::validation("Rating must be between 1 and 5 stars"))
    }
}

impl DeveloperRating {
    pub fn new(
        developer_user_id: UserId,
        rater: UserId,
        stars: i16,
        comment: Option<String>,
    ) -> Result<Self, AppError> {
        Ok(Self {
            id: RatingId::new(),
            developer_user_id,
            user_id: rater,
            stars: validate_stars(stars)?,
            comment,
            created_at: Utc::now(),
            updated_at: None,
        })
    }

    pub fn revise(&mut self, stars: i16, comment: Option<String>) -> Result<(), AppError> {
        self.stars = validate_stars(stars)?;
        self.comment = comment;
        self.updated_at = Some(Utc::now());
        Ok(())
    }
}

/// 评分汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub average_rating: f64,
    pub total_ratings: usize,
    /// 星级 => 数量（1..=5 均出现）
    pub rating_distribution: BTreeMap<u8, usize>,
}

impl RatingSummary {
    pub fn from_ratings(ratings: &[DeveloperRating]) -> Self {
        let mut distribution: BTreeMap<u8, usize> = (1..=5).map(|s| (s, 0)).collect();
        for rating in ratings {
            if let Ok(star) = u8::try_from(rating.stars) {
                *distribution.entry(star).or_insert(0) += 1;
            }
        }

        let total = ratings.len();
        let average = if total == 0 {
            0.0
        } else {
            let sum: i64 = ratings.iter().map(|r| i64::from(r.stars)).sum();
            // 保留两位小数
            ((sum as f64 / total as f64) * 100.0).round() / 100.0
        };

        Self {
            average_rating: average,
            total_ratings: total,
            rating_distribution: distribution,
        }
    }
}
