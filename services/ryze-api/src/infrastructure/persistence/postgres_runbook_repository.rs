//! PostgreSQL 运维手册 Repository 实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ryze_adapter_postgres::map_db_error;
use ryze_common::{ExecutionId, RunbookId, UserId};
use ryze_errors::AppResult;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::domain::entities::{Runbook, RunbookExecution, StepResult};
use crate::domain::repositories::RunbookRepository;

pub struct PostgresRunbookRepository {
    pool: PgPool,
}

impl PostgresRunbookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RunbookRepository for PostgresRunbookRepository {
    async fn find_by_id(&self, id: &RunbookId) -> AppResult<Option<Runbook>> {
        let row = sqlx::query_as::<_, RunbookRow>(
            "SELECT id, user_id, title, description, commands, tags, created_at, updated_at \
             FROM runbooks WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "runbook"))?;

        Ok(row.map(Into::into))
    }

    async fn list_by_owner(&self, owner: &UserId, tag: Option<String>) -> AppResult<Vec<Runbook>> {
        let tag = tag.map(|t| t.trim().to_lowercase());
        let rows = sqlx::query_as::<_, RunbookRow>(
            r#"
            SELECT id, user_id, title, description, commands, tags, created_at, updated_at
            FROM runbooks
            WHERE user_id = $1 AND ($2::text IS NULL OR $2 = ANY(tags))
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner.0)
        .bind(tag)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "runbook"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn save(&self, runbook: &Runbook) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO runbooks (id, user_id, title, description, commands, tags,
                                  created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(runbook.id.0)
        .bind(runbook.user_id.0)
        .bind(&runbook.title)
        .bind(&runbook.description)
        .bind(&runbook.commands)
        .bind(&runbook.tags)
        .bind(runbook.created_at)
        .bind(runbook.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Runbook"))?;

        Ok(())
    }

    async fn update(&self, runbook: &Runbook) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE runbooks SET
                title = $2, description = $3, commands = $4, tags = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(runbook.id.0)
        .bind(&runbook.title)
        .bind(&runbook.description)
        .bind(&runbook.commands)
        .bind(&runbook.tags)
        .bind(runbook.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "runbook"))?;

        Ok(())
    }

    async fn delete(&self, id: &RunbookId) -> AppResult<()> {
        sqlx::query("DELETE FROM runbooks WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "runbook"))?;

        Ok(())
    }

    async fn save_execution(&self, execution: &RunbookExecution) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO runbook_executions (id, runbook_id, user_id, dry_run, started_at,
                                            finished_at, succeeded, results)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(execution.id.0)
        .bind(execution.runbook_id.0)
        .bind(execution.user_id.0)
        .bind(execution.dry_run)
        .bind(execution.started_at)
        .bind(execution.finished_at)
        .bind(execution.succeeded)
        .bind(Json(&execution.results))
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Execution"))?;

        Ok(())
    }

    async fn list_executions(
        &self,
        runbook_id: &RunbookId,
        limit: i64,
    ) -> AppResult<Vec<RunbookExecution>> {
        let rows = sqlx::query_as::<_, ExecutionRow>(
            r#"
            SELECT id, runbook_id, user_id, dry_run, started_at, finished_at, succeeded, results
            FROM runbook_executions
            WHERE runbook_id = $1
            ORDER BY started_at DESC
            LIMIT $2
            "#,
        )
        .bind(runbook_id.0)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "execution"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[derive(sqlx::FromRow)]
struct RunbookRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    description: Option<String>,
    commands: Vec<String>,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<RunbookRow> for Runbook {
    fn from(row: RunbookRow) -> Self {
        Self {
            id: RunbookId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            title: row.title,
            description: row.description,
            commands: row.commands,
            tags: row.tags,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ExecutionRow {
    id: Uuid,
    runbook_id: Uuid,
    user_id: Uuid,
    dry_run: bool,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    succeeded: bool,
    results: Json<Vec<StepResult>>,
}

impl From<ExecutionRow> for RunbookExecution {
    fn from(row: ExecutionRow) -> Self {
        Self {
            id: ExecutionId::from_uuid(row.id),
            runbook_id: RunbookId::from_uuid(row.runbook_id),
            user_id: UserId::from_uuid(row.user_id),
            dry_run: row.dry_run,
            started_at: row.started_at,
            finished_at: row.finished_at,
            succeeded: row.succeeded,
            results: row.results.0,
        }
    }
}
