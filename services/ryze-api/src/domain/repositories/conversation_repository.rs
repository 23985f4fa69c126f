//! 会话 Repository trait

use async_trait::async_trait;
use ryze_common::{ConversationId, RequestId, UserId};
use ryze_errors::AppResult;

use crate::domain::entities::{Conversation, ConversationMessage};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn find_by_id(&self, id: &ConversationId) -> AppResult<Option<Conversation>>;

    async fn find_by_request_and_starter(
        &self,
        request_id: &RequestId,
        starter: &UserId,
    ) -> AppResult<Option<Conversation>>;

    async fn save(&self, conversation: &Conversation) -> AppResult<()>;

    async fn update(&self, conversation: &Conversation) -> AppResult<()>;

    /// 用户参与的会话
    async fn list_for_user(&self, user_id: &UserId) -> AppResult<Vec<Conversation>>;

    /// 需求下的会话
    async fn list_by_request(&self, request_id: &RequestId) -> AppResult<Vec<Conversation>>;

    async fn add_message(&self, message: &ConversationMessage) -> AppResult<()>;

    /// 会话消息（按创建时间升序）
    async fn list_messages(
        &self,
        conversation_id: &ConversationId,
    ) -> AppResult<Vec<ConversationMessage>>;
}
