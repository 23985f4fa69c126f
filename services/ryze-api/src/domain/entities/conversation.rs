//! 开发者与客户之间的会话

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use ryze_common::{ConversationId, MessageId, RequestId, UserId};
use ryze_errors::AppError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStatus {
    Active,
    Negotiating,
    Agreed,
    Completed,
}

impl ConversationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Negotiating => "negotiating",
            Self::Agreed => "agreed",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for ConversationStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "negotiating" => Ok(Self::Negotiating),
            "agreed" => Ok(Self::Agreed),
            "completed" => Ok(Self::Completed),
            other => Err(AppError::validation(format!(
                "Invalid conversation status: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub request_id: RequestId,
    pub starter_user_id: UserId,
    pub recipient_user_id: UserId,
    pub status: ConversationStatus,
    pub agreed_amount: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Conversation {
    pub fn new(request_id: RequestId, starter: UserId, recipient: UserId) -> Self {
        Self {
            id: ConversationId::new(),
            request_id,
            starter_user_id: starter,
            recipient_user_id: recipient,
            status: ConversationStatus::Active,
            agreed_amount: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn is_participant(&self, user_id: &UserId) -> bool {
        self.starter_user_id == *user_id || self.recipient_user_id == *user_id
    }

    pub fn update_status(&mut self, status: ConversationStatus, agreed_amount: Option<f64>) {
        self.status = status;
        if agreed_amount.is_some() {
            self.agreed_amount = agreed_amount;
        }
        self.touch();
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

/// 消息附带的链接内容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub content_id: UserId,
    pub title: String,
    pub url: String,
}

impl LinkedContent {
    /// 开发者资料链接
    pub fn developer_profile(user_id: UserId, username: &str) -> Self {
        Self {
            content_type: "profile".to_string(),
            content_id: user_id,
            title: username.to_string(),
            url: format!("/profile/developer/{}", user_id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub user_id: UserId,
    pub content: String,
    pub linked_content: Vec<LinkedContent>,
    pub created_at: DateTime<Utc>,
}

impl ConversationMessage {
    pub fn new(
        conversation_id: ConversationId,
        user_id: UserId,
        content: &str,
    ) -> Result<Self, AppError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::validation("Message content cannot be empty"));
        }
        Ok(Self {
            id: MessageId::new(),
            conversation_id,
            user_id,
            content: content.to_string(),
            linked_content: Vec::new(),
            created_at: Utc::now(),
        })
    }

    pub fn with_link(mut self, link: LinkedContent) -> Self {
        self.linked_content.push(link);
        self
    }
}
