//! PostgreSQL 反馈 Repository 实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ryze_adapter_postgres::map_db_error;
use ryze_common::FeedbackId;
use ryze_errors::AppResult;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::Feedback;
use crate::domain::repositories::FeedbackRepository;

pub struct PostgresFeedbackRepository {
    pool: PgPool,
}

impl PostgresFeedbackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeedbackRepository for PostgresFeedbackRepository {
    async fn save(&self, feedback: &Feedback) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO feedback (id, name, email, rating, comment, location, target_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(feedback.id.0)
        .bind(&feedback.name)
        .bind(&feedback.email)
        .bind(feedback.rating)
        .bind(&feedback.comment)
        .bind(&feedback.location)
        .bind(&feedback.target_id)
        .bind(feedback.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Feedback"))?;

        Ok(())
    }

    async fn list_all(&self) -> AppResult<Vec<Feedback>> {
        let rows = sqlx::query_as::<_, FeedbackRow>(
            "SELECT id, name, email, rating, comment, location, target_id, created_at \
             FROM feedback ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "feedback"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[derive(sqlx::FromRow)]
struct FeedbackRow {
    id: Uuid,
    name: Option<String>,
    email: Option<String>,
    rating: i16,
    comment: String,
    location: String,
    target_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<FeedbackRow> for Feedback {
    fn from(row: FeedbackRow) -> Self {
        Self {
            id: FeedbackId::from_uuid(row.id),
            name: row.name,
            email: row.email,
            rating: row.rating,
            comment: row.comment,
            location: row.location,
            target_id: row.target_id,
            created_at: row.created_at,
        }
    }
}
