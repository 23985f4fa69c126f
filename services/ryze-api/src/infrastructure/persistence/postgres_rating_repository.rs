//! PostgreSQL 开发者评分 Repository 实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ryze_adapter_postgres::map_db_error;
use ryze_common::{RatingId, UserId};
use ryze_errors::AppResult;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::DeveloperRating;
use crate::domain::repositories::RatingRepository;

pub struct PostgresRatingRepository {
    pool: PgPool,
}

impl PostgresRatingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RatingRepository for PostgresRatingRepository {
    async fn find(&self, developer: &UserId, rater: &UserId) -> AppResult<Option<DeveloperRating>> {
        let row = sqlx::query_as::<_, RatingRow>(
            "SELECT id, developer_user_id, user_id, stars, comment, created_at, updated_at \
             FROM developer_ratings WHERE developer_user_id = $1 AND user_id = $2",
        )
        .bind(developer.0)
        .bind(rater.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "rating"))?;

        Ok(row.map(Into::into))
    }

    async fn save(&self, rating: &DeveloperRating) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO developer_ratings (id, developer_user_id, user_id, stars, comment,
                                           created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(rating.id.0)
        .bind(rating.developer_user_id.0)
        .bind(rating.user_id.0)
        .bind(rating.stars)
        .bind(&rating.comment)
        .bind(rating.created_at)
        .bind(rating.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Rating"))?;

        Ok(())
    }

    async fn update(&self, rating: &DeveloperRating) -> AppResult<()> {
        sqlx::query(
            "UPDATE developer_ratings SET stars = $2, comment = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(rating.id.0)
        .bind(rating.stars)
        .bind(&rating.comment)
        .bind(rating.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "rating"))?;

        Ok(())
    }

    async fn list_by_developer(&self, developer: &UserId) -> AppResult<Vec<DeveloperRating>> {
        let rows = sqlx::query_as::<_, RatingRow>(
            "SELECT id, developer_user_id, user_id, stars, comment, created_at, updated_at \
             FROM developer_ratings WHERE developer_user_id = $1 ORDER BY created_at DESC",
        )
        .bind(developer.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "rating"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[derive(sqlx::FromRow)]
struct RatingRow {
    id: Uuid,
    developer_user_id: Uuid,
    user_id: Uuid,
    stars: i16,
    comment: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<RatingRow> for DeveloperRating {
    fn from(row: RatingRow) -> Self {
        Self {
            id: RatingId::from_uuid(row.id),
            developer_user_id: UserId::from_uuid(row.developer_user_id),
            user_id: UserId::from_uuid(row.user_id),
            stars: row.stars,
            comment: row.comment,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
