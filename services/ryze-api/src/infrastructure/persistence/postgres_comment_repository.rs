//! PostgreSQL 评论与投票 Repository 实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ryze_adapter_postgres::map_db_error;
use ryze_common::{CommentId, RequestId, UserId};
use ryze_errors::AppResult;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{Comment, CommentVote};
use crate::domain::repositories::CommentRepository;

pub struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn find_by_id(&self, id: &CommentId) -> AppResult<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentRow>(
            "SELECT id, request_id, user_id, parent_id, content, created_at, updated_at \
             FROM request_comments WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "comment"))?;

        Ok(row.map(Into::into))
    }

    async fn save(&self, comment: &Comment) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO request_comments (id, request_id, user_id, parent_id, content,
                                          created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(comment.id.0)
        .bind(comment.request_id.0)
        .bind(comment.user_id.0)
        .bind(comment.parent_id.map(|p| p.0))
        .bind(&comment.content)
        .bind(comment.created_at)
        .bind(comment.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Comment"))?;

        Ok(())
    }

    async fn list_by_request(&self, request_id: &RequestId) -> AppResult<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            "SELECT id, request_id, user_id, parent_id, content, created_at, updated_at \
             FROM request_comments WHERE request_id = $1 ORDER BY created_at",
        )
        .bind(request_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "comment"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// 回复通过 parent_id 的 ON DELETE CASCADE 一并删除
    async fn delete_with_replies(&self, id: &CommentId) -> AppResult<()> {
        sqlx::query("DELETE FROM request_comments WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "comment"))?;

        Ok(())
    }

    async fn list_votes_for_request(&self, request_id: &RequestId) -> AppResult<Vec<CommentVote>> {
        let rows = sqlx::query_as::<_, VoteRow>(
            "SELECT v.user_id, v.comment_id, v.vote_type \
             FROM comment_votes v \
             JOIN request_comments c ON c.id = v.comment_id \
             WHERE c.request_id = $1",
        )
        .bind(request_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "vote"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn upsert_vote(&self, vote: &CommentVote) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO comment_votes (user_id, comment_id, vote_type)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, comment_id) DO UPDATE SET vote_type = EXCLUDED.vote_type
            "#,
        )
        .bind(vote.user_id.0)
        .bind(vote.comment_id.0)
        .bind(vote.vote_type)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "vote"))?;

        Ok(())
    }

    async fn delete_vote(&self, user_id: &UserId, comment_id: &CommentId) -> AppResult<()> {
        sqlx::query("DELETE FROM comment_votes WHERE user_id = $1 AND comment_id = $2")
            .bind(user_id.0)
            .bind(comment_id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "vote"))?;

        Ok(())
    }

    async fn vote_count(&self, comment_id: &CommentId) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(vote_type), 0)::BIGINT FROM comment_votes WHERE comment_id = $1",
        )
        .bind(comment_id.0)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "vote"))?;

        Ok(result.0)
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    request_id: Uuid,
    user_id: Uuid,
    parent_id: Option<Uuid>,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: CommentId::from_uuid(row.id),
            request_id: RequestId::from_uuid(row.request_id),
            user_id: UserId::from_uuid(row.user_id),
            parent_id: row.parent_id.map(CommentId::from_uuid),
            content: row.content,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct VoteRow {
    user_id: Uuid,
    comment_id: Uuid,
    vote_type: i16,
}

impl From<VoteRow> for CommentVote {
    fn from(row: VoteRow) -> Self {
        Self {
            user_id: UserId::from_uuid(row.user_id),
            comment_id: CommentId::from_uuid(row.comment_id),
            vote_type: row.vote_type,
        }
    }
}
