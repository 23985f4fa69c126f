//! PostgreSQL 会话与消息 Repository 实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ryze_adapter_postgres::map_db_error;
use ryze_common::{ConversationId, MessageId, RequestId, UserId};
use ryze_errors::{AppError, AppResult};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::domain::entities::{
    Conversation, ConversationMessage, ConversationStatus, LinkedContent,
};
use crate::domain::repositories::ConversationRepository;

const CONVERSATION_COLUMNS: &str = "id, request_id, starter_user_id, recipient_user_id, \
                                    status, agreed_amount, created_at, updated_at";

pub struct PostgresConversationRepository {
    pool: PgPool,
}

impl PostgresConversationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationRepository for PostgresConversationRepository {
    async fn find_by_id(&self, id: &ConversationId) -> AppResult<Option<Conversation>> {
        let row = sqlx::query_as::<_, ConversationRow>(&format!(
            "SELECT {} FROM conversations WHERE id = $1",
            CONVERSATION_COLUMNS
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "conversation"))?;

        row.map(ConversationRow::into_conversation).transpose()
    }

    async fn find_by_request_and_starter(
        &self,
        request_id: &RequestId,
        starter: &UserId,
    ) -> AppResult<Option<Conversation>> {
        let row = sqlx::query_as::<_, ConversationRow>(&format!(
            "SELECT {} FROM conversations WHERE request_id = $1 AND starter_user_id = $2",
            CONVERSATION_COLUMNS
        ))
        .bind(request_id.0)
        .bind(starter.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "conversation"))?;

        row.map(ConversationRow::into_conversation).transpose()
    }

    async fn save(&self, conversation: &Conversation) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO conversations (id, request_id, starter_user_id, recipient_user_id,
                                       status, agreed_amount, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(conversation.id.0)
        .bind(conversation.request_id.0)
        .bind(conversation.starter_user_id.0)
        .bind(conversation.recipient_user_id.0)
        .bind(conversation.status.as_str())
        .bind(conversation.agreed_amount)
        .bind(conversation.created_at)
        .bind(conversation.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Conversation"))?;

        Ok(())
    }

    async fn update(&self, conversation: &Conversation) -> AppResult<()> {
        sqlx::query(
            "UPDATE conversations SET status = $2, agreed_amount = $3, updated_at = $4 \
             WHERE id = $1",
        )
        .bind(conversation.id.0)
        .bind(conversation.status.as_str())
        .bind(conversation.agreed_amount)
        .bind(conversation.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "conversation"))?;

        Ok(())
    }

    async fn list_for_user(&self, user_id: &UserId) -> AppResult<Vec<Conversation>> {
        let rows = sqlx::query_as::<_, ConversationRow>(&format!(
            "SELECT {} FROM conversations \
             WHERE starter_user_id = $1 OR recipient_user_id = $1 \
             ORDER BY COALESCE(updated_at, created_at) DESC",
            CONVERSATION_COLUMNS
        ))
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "conversation"))?;

        rows.into_iter()
            .map(ConversationRow::into_conversation)
            .collect()
    }

    async fn list_by_request(&self, request_id: &RequestId) -> AppResult<Vec<Conversation>> {
        let rows = sqlx::query_as::<_, ConversationRow>(&format!(
            "SELECT {} FROM conversations WHERE request_id = $1 ORDER BY created_at",
            CONVERSATION_COLUMNS
        ))
        .bind(request_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "conversation"))?;

        rows.into_iter()
            .map(ConversationRow::into_conversation)
            .collect()
    }

    async fn add_message(&self, message: &ConversationMessage) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO conversation_messages (id, conversation_id, user_id, content,
                                               linked_content, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(message.id.0)
        .bind(message.conversation_id.0)
        .bind(message.user_id.0)
        .bind(&message.content)
        .bind(Json(&message.linked_content))
        .bind(message.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Message"))?;

        Ok(())
    }

    async fn list_messages(
        &self,
        conversation_id: &ConversationId,
    ) -> AppResult<Vec<ConversationMessage>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            "SELECT id, conversation_id, user_id, content, linked_content, created_at \
             FROM conversation_messages WHERE conversation_id = $1 ORDER BY created_at",
        )
        .bind(conversation_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "message"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[derive(sqlx::FromRow)]
struct ConversationRow {
    id: Uuid,
    request_id: Uuid,
    starter_user_id: Uuid,
    recipient_user_id: Uuid,
    status: String,
    agreed_amount: Option<f64>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl ConversationRow {
    fn into_conversation(self) -> AppResult<Conversation> {
        let status: ConversationStatus = self.status.parse().map_err(|_| {
            AppError::database(format!(
                "Invalid status '{}' in database for conversation {}",
                self.status, self.id
            ))
        })?;

        Ok(Conversation {
            id: ConversationId::from_uuid(self.id),
            request_id: RequestId::from_uuid(self.request_id),
            starter_user_id: UserId::from_uuid(self.starter_user_id),
            recipient_user_id: UserId::from_uuid(self.recipient_user_id),
            status,
            agreed_amount: self.agreed_amount,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    conversation_id: Uuid,
    user_id: Uuid,
    content: String,
    linked_content: Json<Vec<LinkedContent>>,
    created_at: DateTime<Utc>,
}

impl From<MessageRow> for ConversationMessage {
    fn from(row: MessageRow) -> Self {
        Self {
            id: MessageId::from_uuid(row.id),
            conversation_id: ConversationId::from_uuid(row.conversation_id),
            user_id: UserId::from_uuid(row.user_id),
            content: row.content,
            linked_content: row.linked_content.0,
            created_at: row.created_at,
        }
    }
}
