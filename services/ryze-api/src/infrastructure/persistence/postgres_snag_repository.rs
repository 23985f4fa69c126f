//! PostgreSQL 抢单 Repository 实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ryze_adapter_postgres::map_db_error;
use ryze_common::{RequestId, SnagId, UserId};
use ryze_errors::AppResult;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::SnaggedRequest;
use crate::domain::repositories::SnagRepository;

pub struct PostgresSnagRepository {
    pool: PgPool,
}

impl PostgresSnagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SnagRepository for PostgresSnagRepository {
    async fn find(
        &self,
        request_id: &RequestId,
        developer_id: &UserId,
    ) -> AppResult<Option<SnaggedRequest>> {
        let row = sqlx::query_as::<_, SnagRow>(
            "SELECT id, request_id, developer_id, snagged_at, is_active \
             FROM snagged_requests WHERE request_id = $1 AND developer_id = $2",
        )
        .bind(request_id.0)
        .bind(developer_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "snag"))?;

        Ok(row.map(Into::into))
    }

    async fn save(&self, snag: &SnaggedRequest) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO snagged_requests (id, request_id, developer_id, snagged_at, is_active) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(snag.id.0)
        .bind(snag.request_id.0)
        .bind(snag.developer_id.0)
        .bind(snag.snagged_at)
        .bind(snag.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Snag"))?;

        Ok(())
    }

    async fn update(&self, snag: &SnaggedRequest) -> AppResult<()> {
        sqlx::query("UPDATE snagged_requests SET snagged_at = $2, is_active = $3 WHERE id = $1")
            .bind(snag.id.0)
            .bind(snag.snagged_at)
            .bind(snag.is_active)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "snag"))?;

        Ok(())
    }

    async fn list_active_by_developer(
        &self,
        developer_id: &UserId,
    ) -> AppResult<Vec<SnaggedRequest>> {
        let rows = sqlx::query_as::<_, SnagRow>(
            "SELECT id, request_id, developer_id, snagged_at, is_active \
             FROM snagged_requests WHERE developer_id = $1 AND is_active = TRUE \
             ORDER BY snagged_at DESC",
        )
        .bind(developer_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "snag"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[derive(sqlx::FromRow)]
struct SnagRow {
    id: Uuid,
    request_id: Uuid,
    developer_id: Uuid,
    snagged_at: DateTime<Utc>,
    is_active: bool,
}

impl From<SnagRow> for SnaggedRequest {
    fn from(row: SnagRow) -> Self {
        Self {
            id: SnagId::from_uuid(row.id),
            request_id: RequestId::from_uuid(row.request_id),
            developer_id: UserId::from_uuid(row.developer_id),
            snagged_at: row.snagged_at,
            is_active: row.is_active,
        }
    }
}
