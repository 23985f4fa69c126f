//! PostgreSQL 需求与共享 Repository 实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ryze_adapter_postgres::map_db_error;
use ryze_common::{Pagination, ProjectId, RequestId, UserId};
use ryze_errors::{AppError, AppResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{Request, RequestShare, RequestStatus};
use crate::domain::repositories::RequestRepository;

const REQUEST_COLUMNS: &str = "r.id, r.title, r.content, r.user_id, r.status, r.project_id, \
     r.added_to_project_at, r.is_public, r.contains_sensitive_data, r.estimated_budget, \
     r.agreed_amount, r.is_idea, r.seeks_collaboration, r.collaboration_details, \
     r.request_metadata, r.created_at, r.updated_at";

pub struct PostgresRequestRepository {
    pool: PgPool,
}

impl PostgresRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RequestRepository for PostgresRequestRepository {
    async fn find_by_id(&self, id: &RequestId) -> AppResult<Option<Request>> {
        let row = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {} FROM requests r WHERE r.id = $1",
            REQUEST_COLUMNS
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "request"))?;

        row.map(RequestRow::into_request).transpose()
    }

    async fn save(&self, request: &Request) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO requests (id, title, content, user_id, status, project_id,
                                  added_to_project_at, is_public, contains_sensitive_data,
                                  estimated_budget, agreed_amount, is_idea, seeks_collaboration,
                                  collaboration_details, request_metadata, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(request.id.0)
        .bind(&request.title)
        .bind(&request.content)
        .bind(request.user_id.0)
        .bind(request.status.as_str())
        .bind(request.project_id.map(|p| p.0))
        .bind(request.added_to_project_at)
        .bind(request.is_public)
        .bind(request.contains_sensitive_data)
        .bind(request.estimated_budget)
        .bind(request.agreed_amount)
        .bind(request.is_idea)
        .bind(request.seeks_collaboration)
        .bind(&request.collaboration_details)
        .bind(&request.request_metadata)
        .bind(request.created_at)
        .bind(request.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Request"))?;

        Ok(())
    }

    async fn update(&self, request: &Request) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE requests SET
                title = $2, content = $3, status = $4, project_id = $5, added_to_project_at = $6,
                is_public = $7, contains_sensitive_data = $8, estimated_budget = $9,
                agreed_amount = $10, is_idea = $11, seeks_collaboration = $12,
                collaboration_details = $13, request_metadata = $14, updated_at = $15
            WHERE id = $1
            "#,
        )
        .bind(request.id.0)
        .bind(&request.title)
        .bind(&request.content)
        .bind(request.status.as_str())
        .bind(request.project_id.map(|p| p.0))
        .bind(request.added_to_project_at)
        .bind(request.is_public)
        .bind(request.contains_sensitive_data)
        .bind(request.estimated_budget)
        .bind(request.agreed_amount)
        .bind(request.is_idea)
        .bind(request.seeks_collaboration)
        .bind(&request.collaboration_details)
        .bind(&request.request_metadata)
        .bind(request.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "request"))?;

        Ok(())
    }

    async fn delete(&self, id: &RequestId) -> AppResult<()> {
        sqlx::query("DELETE FROM requests WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "request"))?;

        Ok(())
    }

    async fn list_by_owner(
        &self,
        owner: &UserId,
        project_id: Option<ProjectId>,
    ) -> AppResult<Vec<Request>> {
        let rows = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {} FROM requests r \
             WHERE r.user_id = $1 AND ($2::uuid IS NULL OR r.project_id = $2) \
             ORDER BY r.created_at DESC",
            REQUEST_COLUMNS
        ))
        .bind(owner.0)
        .bind(project_id.map(|p| p.0))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "request"))?;

        rows.into_iter().map(RequestRow::into_request).collect()
    }

    async fn list_by_project(&self, project_id: &ProjectId) -> AppResult<Vec<Request>> {
        let rows = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {} FROM requests r WHERE r.project_id = $1 ORDER BY r.created_at DESC",
            REQUEST_COLUMNS
        ))
        .bind(project_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "request"))?;

        rows.into_iter().map(RequestRow::into_request).collect()
    }

    async fn list_public(&self, page: Pagination) -> AppResult<Vec<Request>> {
        let rows = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {} FROM requests r WHERE r.is_public = TRUE \
             ORDER BY r.created_at DESC LIMIT $1 OFFSET $2",
            REQUEST_COLUMNS
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "request"))?;

        rows.into_iter().map(RequestRow::into_request).collect()
    }

    async fn list_shared_with(&self, user_id: &UserId) -> AppResult<Vec<Request>> {
        let rows = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {} FROM requests r \
             JOIN request_shares s ON s.request_id = r.id \
             WHERE s.shared_with_user_id = $1 \
             ORDER BY r.created_at DESC",
            REQUEST_COLUMNS
        ))
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "request"))?;

        rows.into_iter().map(RequestRow::into_request).collect()
    }

    async fn find_share(
        &self,
        request_id: &RequestId,
        user_id: &UserId,
    ) -> AppResult<Option<RequestShare>> {
        let row = sqlx::query_as::<_, ShareRow>(
            "SELECT request_id, shared_with_user_id, can_edit, created_at, viewed_at \
             FROM request_shares WHERE request_id = $1 AND shared_with_user_id = $2",
        )
        .bind(request_id.0)
        .bind(user_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "share"))?;

        Ok(row.map(Into::into))
    }

    async fn list_shares(&self, request_id: &RequestId) -> AppResult<Vec<RequestShare>> {
        let rows = sqlx::query_as::<_, ShareRow>(
            "SELECT request_id, shared_with_user_id, can_edit, created_at, viewed_at \
             FROM request_shares WHERE request_id = $1 ORDER BY created_at",
        )
        .bind(request_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "share"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn save_share(&self, share: &RequestShare) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO request_shares (request_id, shared_with_user_id, can_edit, created_at, viewed_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(share.request_id.0)
        .bind(share.shared_with_user_id.0)
        .bind(share.can_edit)
        .bind(share.created_at)
        .bind(share.viewed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Share"))?;

        Ok(())
    }

    async fn delete_share(&self, request_id: &RequestId, user_id: &UserId) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM request_shares WHERE request_id = $1 AND shared_with_user_id = $2",
        )
        .bind(request_id.0)
        .bind(user_id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "share"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_share_viewed(
        &self,
        request_id: &RequestId,
        user_id: &UserId,
        viewed_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE request_shares SET viewed_at = $3 \
             WHERE request_id = $1 AND shared_with_user_id = $2 AND viewed_at IS NULL",
        )
        .bind(request_id.0)
        .bind(user_id.0)
        .bind(viewed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "share"))?;

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct RequestRow {
    id: Uuid,
    title: String,
    content: String,
    user_id: Uuid,
    status: String,
    project_id: Option<Uuid>,
    added_to_project_at: Option<DateTime<Utc>>,
    is_public: bool,
    contains_sensitive_data: bool,
    estimated_budget: Option<f64>,
    agreed_amount: Option<f64>,
    is_idea: bool,
    seeks_collaboration: bool,
    collaboration_details: Option<String>,
    request_metadata: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl RequestRow {
    fn into_request(self) -> AppResult<Request> {
        let status: RequestStatus = self.status.parse().map_err(|_| {
            AppError::database(format!(
                "Invalid status '{}' in database for request {}",
                self.status, self.id
            ))
        })?;

        Ok(Request {
            id: RequestId::from_uuid(self.id),
            title: self.title,
            content: self.content,
            user_id: UserId::from_uuid(self.user_id),
            status,
            project_id: self.project_id.map(ProjectId::from_uuid),
            added_to_project_at: self.added_to_project_at,
            is_public: self.is_public,
            contains_sensitive_data: self.contains_sensitive_data,
            estimated_budget: self.estimated_budget,
            agreed_amount: self.agreed_amount,
            is_idea: self.is_idea,
            seeks_collaboration: self.seeks_collaboration,
            collaboration_details: self.collaboration_details,
            request_metadata: self.request_metadata,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ShareRow {
    request_id: Uuid,
    shared_with_user_id: Uuid,
    can_edit: bool,
    created_at: DateTime<Utc>,
    viewed_at: Option<DateTime<Utc>>,
}

impl From<ShareRow> for RequestShare {
    fn from(row: ShareRow) -> Self {
        Self {
            request_id: RequestId::from_uuid(row.request_id),
            shared_with_user_id: UserId::from_uuid(row.shared_with_user_id),
            can_edit: row.can_edit,
            created_at: row.created_at,
            viewed_at: row.viewed_at,
        }
    }
}
