//! 开发者抢单

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use ryze_common::{ConversationId, RequestId, SnagId, UserId};
use ryze_errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::entities::{RequestStatus, SnaggedRequest, User};
use crate::domain::repositories::{RequestRepository, SnagRepository, UserRepository};

use super::conversation_service::ConversationService;

#[derive(Debug, Clone, Deserialize)]
pub struct SnagCommand {
    pub request_id: RequestId,
    pub message: String,
    #[serde(default)]
    pub include_profile: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnagOut {
    pub id: SnagId,
    pub request_id: RequestId,
    pub conversation_id: ConversationId,
    pub snagged_at: DateTime<Utc>,
}

/// 抢单列表中的需求摘要
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnaggedRequestSummary {
    pub id: RequestId,
    pub title: String,
    pub content: String,
    pub status: RequestStatus,
    pub estimated_budget: Option<f64>,
    pub owner_username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnagListItem {
    pub id: SnagId,
    pub snagged_at: DateTime<Utc>,
    pub request: SnaggedRequestSummary,
}

pub struct SnagService {
    snags: Arc<dyn SnagRepository>,
    requests: Arc<dyn RequestRepository>,
    users: Arc<dyn UserRepository>,
    conversations: Arc<ConversationService>,
}

impl SnagService {
    pub fn new(
        snags: Arc<dyn SnagRepository>,
        requests: Arc<dyn RequestRepository>,
        users: Arc<dyn UserRepository>,
        conversations: Arc<ConversationService>,
    ) -> Self {
        Self {
            snags,
            requests,
            users,
            conversations,
        }
    }

    /// 抢单：校验需求后打开（或复用）会话并发送消息
    pub async fn snag(&self, developer: &User, cmd: SnagCommand) -> AppResult<SnagOut> {
        let request = self
            .requests
            .find_by_id(&cmd.request_id)
            .await?
            .ok_or_else(|| AppError::not_found("Request not found"))?;
        if !request.is_public {
            return Err(AppError::validation("Only public requests can be snagged"));
        }
        if request.status != RequestStatus::Open {
            return Err(AppError::validation("Only open requests can be snagged"));
        }
        if request.is_owned_by(&developer.id) {
            return Err(AppError::validation("Cannot snag your own request"));
        }

        let existing = self.snags.find(&request.id, &developer.id).await?;
        if existing.as_ref().is_some_and(|s| s.is_active) {
            return Err(AppError::conflict("Request already snagged"));
        }
        // 先校验消息，避免留下没有抢单记录的空会话
        if cmd.message.trim().is_empty() {
            return Err(AppError::validation("Message content cannot be empty"));
        }

        let (mut conversation, _) = self
            .conversations
            .ensure_conversation(&request, developer)
            .await?;
        self.conversations
            .post(&mut conversation, developer, &cmd.message, cmd.include_profile)
            .await?;

        let snag = match existing {
            Some(mut previous) => {
                previous.reactivate();
                self.snags.update(&previous).await?;
                previous
            }
            None => {
                let snag = SnaggedRequest::new(request.id, developer.id);
                self.snags.save(&snag).await?;
                snag
            }
        };

        info!(request_id = %request.id, developer_id = %developer.id, "Request snagged");
        Ok(SnagOut {
            id: snag.id,
            request_id: snag.request_id,
            conversation_id: conversation.id,
            snagged_at: snag.snagged_at,
        })
    }

    pub async fn list(&self, developer_id: &UserId) -> AppResult<Vec<SnagListItem>> {
        let snags = self.snags.list_active_by_developer(developer_id).await?;

        let mut pairs = Vec::with_capacity(snags.len());
        for snag in snags {
            if let Some(request) = self.requests.find_by_id(&snag.request_id).await? {
                pairs.push((snag, request));
            }
        }

        let owner_ids: Vec<UserId> = pairs.iter().map(|(_, r)| r.user_id).collect();
        let owners: HashMap<UserId, String> = if owner_ids.is_empty() {
            HashMap::new()
        } else {
            self.users
                .find_by_ids(&owner_ids)
                .await?
                .into_iter()
                .map(|u| (u.id, u.username.as_str().to_string()))
                .collect()
        };

        Ok(pairs
            .into_iter()
            .map(|(snag, request)| SnagListItem {
                id: snag.id,
                snagged_at: snag.snagged_at,
                request: SnaggedRequestSummary {
                    owner_username: owners.get(&request.user_id).cloned(),
                    id: request.id,
                    title: request.title,
                    content: request.content,
                    status: request.status,
                    estimated_budget: request.estimated_budget,
                },
            })
            .collect())
    }

    /// 软删除，记录保留以便重新抢单
    pub async fn remove(&self, request_id: &RequestId, developer_id: &UserId) -> AppResult<()> {
        let mut snag = self
            .snags
            .find(request_id, developer_id)
            .await?
            .filter(|s| s.is_active)
            .ok_or_else(|| AppError::not_found("Snagged request not found"))?;
        snag.remove();
        self.snags.update(&snag).await?;
        info!(request_id = %request_id, developer_id = %developer_id, "Snag removed");
        Ok(())
    }
}
