//! 开发者与客户围绕需求的会话

use std::collections::HashMap;
use std::sync::Arc;

use ryze_common::{ConversationId, RequestId, UserId};
use ryze_errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::entities::{
    Conversation, ConversationMessage, ConversationStatus, LinkedContent, Request, User,
};
use crate::domain::repositories::{ConversationRepository, RequestRepository, UserRepository};

use super::request_service::load_viewable;

#[derive(Debug, Clone, Deserialize)]
pub struct StartConversation {
    pub request_id: RequestId,
    pub initial_message: Option<String>,
    #[serde(default)]
    pub include_profile: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostMessage {
    pub content: String,
    #[serde(default)]
    pub include_profile: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateConversationStatus {
    pub status: String,
    pub agreed_amount: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessageOut {
    #[serde(flatten)]
    pub message: ConversationMessage,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationOut {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub request_title: Option<String>,
    pub starter_username: Option<String>,
    pub recipient_username: Option<String>,
    pub messages: Vec<ConversationMessageOut>,
}

pub struct ConversationService {
    conversations: Arc<dyn ConversationRepository>,
    requests: Arc<dyn RequestRepository>,
    users: Arc<dyn UserRepository>,
}

impl ConversationService {
    pub fn new(
        conversations: Arc<dyn ConversationRepository>,
        requests: Arc<dyn RequestRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            conversations,
            requests,
            users,
        }
    }

    /// 开发者就某个需求发起会话，同一 (需求, 发起人) 只会有一个会话
    pub async fn start(&self, starter: &User, input: StartConversation) -> AppResult<ConversationOut> {
        let request = load_viewable(self.requests.as_ref(), &input.request_id, Some(&starter.id))
            .await?;
        let (mut conversation, created) = self.ensure_conversation(&request, starter).await?;

        if created {
            if let Some(text) = input.initial_message.as_deref().filter(|t| !t.trim().is_empty()) {
                self.post(&mut conversation, starter, text, input.include_profile)
                    .await?;
            }
        }
        self.render(conversation).await
    }

    /// 复用已有会话或新建会话，返回值第二项表示是否新建
    pub(crate) async fn ensure_conversation(
        &self,
        request: &Request,
        starter: &User,
    ) -> AppResult<(Conversation, bool)> {
        if request.is_owned_by(&starter.id) {
            return Err(AppError::validation(
                "Cannot start a conversation on your own request",
            ));
        }
        if !starter.is_developer() {
            return Err(AppError::forbidden(
                "Only developers can initiate conversations",
            ));
        }
        let owner = self
            .users
            .find_by_id(&request.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Request owner not found"))?;
        if !owner.is_client() {
            return Err(AppError::validation("Can only respond to client requests"));
        }

        if let Some(existing) = self
            .conversations
            .find_by_request_and_starter(&request.id, &starter.id)
            .await?
        {
            return Ok((existing, false));
        }

        let conversation = Conversation::new(request.id, starter.id, owner.id);
        self.conversations.save(&conversation).await?;
        info!(
            conversation_id = %conversation.id,
            request_id = %request.id,
            developer_id = %starter.id,
            "Conversation started"
        );
        Ok((conversation, true))
    }

    /// 写入消息并刷新会话活动时间
    pub(crate) async fn post(
        &self,
        conversation: &mut Conversation,
        author: &User,
        content: &str,
        include_profile: bool,
    ) -> AppResult<ConversationMessage> {
        let mut message = ConversationMessage::new(conversation.id, author.id, content)?;
        if include_profile {
            message = message.with_link(LinkedContent::developer_profile(
                author.id,
                author.username.as_str(),
            ));
        }
        self.conversations.add_message(&message).await?;

        conversation.touch();
        self.conversations.update(conversation).await?;
        Ok(message)
    }

    pub async fn post_message(
        &self,
        id: &ConversationId,
        author: &User,
        input: PostMessage,
    ) -> AppResult<ConversationMessageOut> {
        let mut conversation = self.participant_view(id, &author.id).await?;
        let message = self
            .post(&mut conversation, author, &input.content, input.include_profile)
            .await?;
        Ok(ConversationMessageOut {
            message,
            username: Some(author.username.as_str().to_string()),
        })
    }

    /// 调用者参与的会话，按最近活动倒序
    pub async fn list_for_user(&self, user_id: &UserId) -> AppResult<Vec<ConversationOut>> {
        let mut conversations = self.conversations.list_for_user(user_id).await?;
        conversations.sort_by_key(|c| std::cmp::Reverse(c.last_activity()));

        let mut rendered = Vec::with_capacity(conversations.len());
        for conversation in conversations {
            rendered.push(self.render(conversation).await?);
        }
        Ok(rendered)
    }

    pub async fn get(&self, id: &ConversationId, user_id: &UserId) -> AppResult<ConversationOut> {
        let conversation = self.participant_view(id, user_id).await?;
        self.render(conversation).await
    }

    /// 进入 agreed 时把金额同步到需求并将需求置为进行中
    pub async fn update_status(
        &self,
        id: &ConversationId,
        user_id: &UserId,
        input: UpdateConversationStatus,
    ) -> AppResult<ConversationOut> {
        let status: ConversationStatus = input.status.trim().parse()?;
        let mut conversation = self.participant_view(id, user_id).await?;

        if status == ConversationStatus::Agreed {
            let mut request = self
                .requests
                .find_by_id(&conversation.request_id)
                .await?
                .ok_or_else(|| AppError::not_found("Request not found"))?;
            request.record_agreement(input.agreed_amount)?;
            self.requests.update(&request).await?;
        }

        conversation.update_status(status, input.agreed_amount);
        self.conversations.update(&conversation).await?;
        info!(conversation_id = %id, status = %status, "Conversation status updated");
        self.render(conversation).await
    }

    async fn participant_view(
        &self,
        id: &ConversationId,
        user_id: &UserId,
    ) -> AppResult<Conversation> {
        let conversation = self
            .conversations
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Conversation not found"))?;
        if !conversation.is_participant(user_id) {
            return Err(AppError::forbidden(
                "Not a participant in this conversation",
            ));
        }
        Ok(conversation)
    }

    async fn render(&self, conversation: Conversation) -> AppResult<ConversationOut> {
        let messages = self.conversations.list_messages(&conversation.id).await?;
        let request_title = self
            .requests
            .find_by_id(&conversation.request_id)
            .await?
            .map(|r| r.title);

        let mut ids = vec![conversation.starter_user_id, conversation.recipient_user_id];
        ids.extend(messages.iter().map(|m| m.user_id));
        ids.sort();
        ids.dedup();
        let names: HashMap<UserId, String> = self
            .users
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.username.as_str().to_string()))
            .collect();

        Ok(ConversationOut {
            request_title,
            starter_username: names.get(&conversation.starter_user_id).cloned(),
            recipient_username: names.get(&conversation.recipient_user_id).cloned(),
            messages: messages
                .into_iter()
                .map(|m| ConversationMessageOut {
                    username: names.get(&m.user_id).cloned(),
                    message: m,
                })
                .collect(),
            conversation,
        })
    }
}
