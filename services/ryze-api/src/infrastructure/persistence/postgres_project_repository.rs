//! PostgreSQL 项目 Repository 实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ryze_adapter_postgres::map_db_error;
use ryze_common::{ProjectId, UserId};
use ryze_errors::AppResult;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::Project;
use crate::domain::repositories::ProjectRepository;

pub struct PostgresProjectRepository {
    pool: PgPool,
}

impl PostgresProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectRepository for PostgresProjectRepository {
    async fn find_by_id(&self, id: &ProjectId) -> AppResult<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(
            "SELECT id, name, description, user_id, is_active, created_at, updated_at \
             FROM projects WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "project"))?;

        Ok(row.map(Into::into))
    }

    async fn list_by_owner(&self, owner: &UserId) -> AppResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            "SELECT id, name, description, user_id, is_active, created_at, updated_at \
             FROM projects WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "project"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn save(&self, project: &Project) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO projects (id, name, description, user_id, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(project.id.0)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.user_id.0)
        .bind(project.is_active)
        .bind(project.created_at)
        .bind(project.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Project"))?;

        Ok(())
    }

    async fn update(&self, project: &Project) -> AppResult<()> {
        sqlx::query(
            "UPDATE projects SET name = $2, description = $3, is_active = $4, updated_at = $5 \
             WHERE id = $1",
        )
        .bind(project.id.0)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.is_active)
        .bind(project.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "project"))?;

        Ok(())
    }

    async fn delete(&self, id: &ProjectId) -> AppResult<()> {
        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "project"))?;

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    user_id: Uuid,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Self {
            id: ProjectId::from_uuid(row.id),
            name: row.name,
            description: row.description,
            user_id: UserId::from_uuid(row.user_id),
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
