//! 需求：创建、可见性、共享、项目归属

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use ryze_common::{Pagination, ProjectId, RequestId, UserId};
use ryze_errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::entities::{Request, RequestError, RequestShare, RequestStatus, User};
use crate::domain::repositories::{ProjectRepository, RequestRepository, UserRepository};
use crate::domain::services::SensitiveContentDetector;

use super::dto::{MAX_NAME_LEN, UserSummary, require_bounded, require_non_empty};

const MAX_PAGE: u32 = 100;
const USER_SEARCH_LIMIT: i64 = 10;
const USER_SEARCH_MIN_LEN: usize = 2;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRequest {
    pub title: String,
    pub content: String,
    pub project_id: Option<ProjectId>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub contains_sensitive_data: bool,
    pub estimated_budget: Option<f64>,
    #[serde(default)]
    pub is_idea: bool,
    #[serde(default)]
    pub seeks_collaboration: bool,
    pub collaboration_details: Option<String>,
    pub request_metadata: Option<serde_json::Value>,
    /// 创建后立即以只读方式共享给该开发者
    pub developer_id: Option<UserId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<RequestStatus>,
    pub is_public: Option<bool>,
    pub estimated_budget: Option<f64>,
    pub is_idea: Option<bool>,
    pub seeks_collaboration: Option<bool>,
    pub collaboration_details: Option<String>,
    pub request_metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShareCommand {
    pub shared_with_user_id: UserId,
    #[serde(default)]
    pub can_edit: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareOut {
    pub user_id: UserId,
    pub username: String,
    pub can_edit: bool,
}

/// 需求输出，附带所有者用户名和共享列表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestOut {
    #[serde(flatten)]
    pub request: Request,
    pub owner_username: Option<String>,
    pub shared_with: Vec<ShareOut>,
}

/// 读取调用者可见的需求，匿名调用者只能看到公开需求
pub(crate) async fn load_viewable(
    requests: &dyn RequestRepository,
    id: &RequestId,
    viewer: Option<&UserId>,
) -> AppResult<Request> {
    let request = requests
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Request not found"))?;
    let allowed = match viewer {
        Some(user_id) => {
            let share = requests.find_share(id, user_id).await?;
            request.can_be_viewed_by(user_id, share.as_ref())
        }
        None => request.is_public,
    };
    if !allowed {
        return Err(AppError::forbidden("Not authorized to view this request"));
    }
    Ok(request)
}

pub struct RequestService {
    requests: Arc<dyn RequestRepository>,
    users: Arc<dyn UserRepository>,
    projects: Arc<dyn ProjectRepository>,
}

impl RequestService {
    pub fn new(
        requests: Arc<dyn RequestRepository>,
        users: Arc<dyn UserRepository>,
        projects: Arc<dyn ProjectRepository>,
    ) -> Self {
        Self {
            requests,
            users,
            projects,
        }
    }

    pub async fn create(&self, owner: &UserId, input: CreateRequest) -> AppResult<RequestOut> {
        let title = require_bounded(&input.title, "Title", MAX_NAME_LEN)?;
        let content = require_non_empty(&input.content, "Content")?;

        let mut request = Request::new(*owner, title, content);
        request.contains_sensitive_data = input.contains_sensitive_data
            || SensitiveContentDetector::any_sensitive(&[&request.title, &request.content]);
        if input.is_public && request.contains_sensitive_data {
            return Err(RequestError::SensitiveCannotBePublic.into());
        }
        request.is_public = input.is_public;
        request.estimated_budget = input.estimated_budget;
        request.is_idea = input.is_idea;
        request.seeks_collaboration = input.seeks_collaboration;
        request.collaboration_details = input.collaboration_details;
        request.request_metadata = input.request_metadata;

        if let Some(project_id) = input.project_id {
            self.owned_project(&project_id, owner).await?;
            request.project_id = Some(project_id);
            request.added_to_project_at = Some(request.created_at);
        }

        let share = match input.developer_id {
            Some(developer_id) => {
                request.ensure_shareable()?;
                self.existing_user(&developer_id).await?;
                Some(RequestShare::new(request.id, developer_id, false))
            }
            None => None,
        };

        self.requests.save(&request).await?;
        if let Some(share) = share {
            self.requests.save_share(&share).await?;
        }

        info!(
            request_id = %request.id,
            user_id = %owner,
            sensitive = request.contains_sensitive_data,
            "Request created"
        );
        self.render(request).await
    }

    /// 自己的需求，默认包含共享给自己的需求
    pub async fn list(
        &self,
        user_id: &UserId,
        project_id: Option<ProjectId>,
        include_shared: bool,
        page: Pagination,
    ) -> AppResult<Vec<RequestOut>> {
        let page = page.clamped(MAX_PAGE);
        let mut requests = self.requests.list_by_owner(user_id, project_id).await?;
        if include_shared {
            let shared = self.requests.list_shared_with(user_id).await?;
            requests.extend(
                shared
                    .into_iter()
                    .filter(|r| project_id.is_none() || r.project_id == project_id),
            );
        }
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let page_items: Vec<Request> = requests
            .into_iter()
            .skip(page.skip as usize)
            .take(page.limit as usize)
            .collect();
        self.render_many(page_items).await
    }

    pub async fn list_public(&self, page: Pagination) -> AppResult<Vec<RequestOut>> {
        let requests = self.requests.list_public(page.clamped(MAX_PAGE)).await?;
        self.render_many(requests).await
    }

    pub async fn shared_with_me(&self, user_id: &UserId) -> AppResult<Vec<RequestOut>> {
        let requests = self.requests.list_shared_with(user_id).await?;
        self.render_many(requests).await
    }

    /// 按可见性读取需求，被共享者首次查看时记录 viewed_at
    pub async fn get(&self, id: &RequestId, viewer: &UserId) -> AppResult<RequestOut> {
        let request = self.find(id).await?;
        let share = self.requests.find_share(id, viewer).await?;
        if !request.can_be_viewed_by(viewer, share.as_ref()) {
            return Err(AppError::forbidden("Not authorized to view this request"));
        }

        if let Some(share) = share.filter(|s| s.viewed_at.is_none()) {
            self.requests
                .mark_share_viewed(&share.request_id, viewer, Utc::now())
                .await?;
            debug!(request_id = %id, user_id = %viewer, "Shared request first viewed");
        }
        self.render(request).await
    }

    pub async fn update(
        &self,
        id: &RequestId,
        editor: &UserId,
        input: UpdateRequest,
    ) -> AppResult<RequestOut> {
        let mut request = self.find(id).await?;
        let share = self.requests.find_share(id, editor).await?;
        if !request.can_be_edited_by(editor, share.as_ref()) {
            return Err(AppError::forbidden("Not authorized to edit this request"));
        }

        let text_changed = input.title.is_some() || input.content.is_some();
        if let Some(title) = input.title {
            request.title = require_bounded(&title, "Title", MAX_NAME_LEN)?;
        }
        if let Some(content) = input.content {
            request.content = require_non_empty(&content, "Content")?;
        }
        if text_changed {
            request.contains_sensitive_data =
                SensitiveContentDetector::any_sensitive(&[&request.title, &request.content]);
        }

        if let Some(is_public) = input.is_public {
            if !request.is_owned_by(editor) {
                return Err(AppError::forbidden(
                    "Only the owner can change request visibility",
                ));
            }
            request.set_visibility(is_public)?;
        }
        // 以本次更新后的最终状态判断
        if request.contains_sensitive_data && request.is_public {
            return Err(AppError::validation(
                "Requests containing sensitive data cannot be made public",
            ));
        }
        if let Some(status) = input.status {
            request.change_status(status)?;
        }
        if input.estimated_budget.is_some() {
            request.estimated_budget = input.estimated_budget;
        }
        if let Some(is_idea) = input.is_idea {
            request.is_idea = is_idea;
        }
        if let Some(seeks) = input.seeks_collaboration {
            request.seeks_collaboration = seeks;
        }
        if input.collaboration_details.is_some() {
            request.collaboration_details = input.collaboration_details;
        }
        if input.request_metadata.is_some() {
            request.request_metadata = input.request_metadata;
        }
        request.touch();

        self.requests.update(&request).await?;
        self.render(request).await
    }

    pub async fn delete(&self, id: &RequestId, owner: &UserId) -> AppResult<()> {
        let request = self.owned(id, owner).await?;
        self.requests.delete(&request.id).await?;
        info!(request_id = %id, "Request deleted");
        Ok(())
    }

    pub async fn share(
        &self,
        id: &RequestId,
        owner: &UserId,
        cmd: ShareCommand,
    ) -> AppResult<ShareOut> {
        let request = self.owned(id, owner).await?;
        request.ensure_shareable()?;
        if cmd.shared_with_user_id == *owner {
            return Err(AppError::validation("Cannot share a request with yourself"));
        }
        let target = self.existing_user(&cmd.shared_with_user_id).await?;
        if self.requests.find_share(id, &target.id).await?.is_some() {
            return Err(AppError::conflict("Request already shared with this user"));
        }

        let share = RequestShare::new(request.id, target.id, cmd.can_edit);
        self.requests.save_share(&share).await?;

        info!(request_id = %id, shared_with = %target.id, can_edit = cmd.can_edit, "Request shared");
        Ok(ShareOut {
            user_id: target.id,
            username: target.username.as_str().to_string(),
            can_edit: share.can_edit,
        })
    }

    pub async fn unshare(&self, id: &RequestId, owner: &UserId, user_id: &UserId) -> AppResult<()> {
        self.owned(id, owner).await?;
        if !self.requests.delete_share(id, user_id).await? {
            return Err(AppError::not_found("Share not found"));
        }
        Ok(())
    }

    pub async fn list_shares(&self, id: &RequestId, owner: &UserId) -> AppResult<Vec<ShareOut>> {
        self.owned(id, owner).await?;
        self.share_entries(id).await
    }

    pub async fn set_privacy(
        &self,
        id: &RequestId,
        owner: &UserId,
        is_public: bool,
    ) -> AppResult<RequestOut> {
        let mut request = self.owned(id, owner).await?;
        request.set_visibility(is_public)?;
        self.requests.update(&request).await?;
        self.render(request).await
    }

    pub async fn attach_project(
        &self,
        id: &RequestId,
        owner: &UserId,
        project_id: ProjectId,
    ) -> AppResult<RequestOut> {
        let mut request = self.owned(id, owner).await?;
        self.owned_project(&project_id, owner).await?;
        request.attach_to_project(project_id);
        self.requests.update(&request).await?;
        self.render(request).await
    }

    pub async fn detach_project(&self, id: &RequestId, owner: &UserId) -> AppResult<RequestOut> {
        let mut request = self.owned(id, owner).await?;
        request.detach_from_project();
        self.requests.update(&request).await?;
        self.render(request).await
    }

    pub async fn search_users(&self, query: &str, caller: &UserId) -> AppResult<Vec<UserSummary>> {
        let query = query.trim();
        if query.chars().count() < USER_SEARCH_MIN_LEN {
            return Err(AppError::validation(
                "Search query must be at least 2 characters",
            ));
        }
        let users = self
            .users
            .search_by_username(query, caller, USER_SEARCH_LIMIT)
            .await?;
        Ok(users.iter().map(UserSummary::with_full_name).collect())
    }

    async fn find(&self, id: &RequestId) -> AppResult<Request> {
        self.requests
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Request not found"))
    }

    async fn owned(&self, id: &RequestId, owner: &UserId) -> AppResult<Request> {
        let request = self.find(id).await?;
        if !request.is_owned_by(owner) {
            return Err(AppError::forbidden(
                "Only the request owner can perform this action",
            ));
        }
        Ok(request)
    }

    async fn owned_project(&self, project_id: &ProjectId, owner: &UserId) -> AppResult<()> {
        self.projects
            .find_by_id(project_id)
            .await?
            .filter(|p| p.is_owned_by(owner))
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("Project not found"))
    }

    async fn existing_user(&self, id: &UserId) -> AppResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    async fn share_entries(&self, id: &RequestId) -> AppResult<Vec<ShareOut>> {
        let shares = self.requests.list_shares(id).await?;
        let ids: Vec<UserId> = shares.iter().map(|s| s.shared_with_user_id).collect();
        let names = self.usernames(&ids).await?;

        Ok(shares
            .into_iter()
            .filter_map(|s| {
                let username = names.get(&s.shared_with_user_id)?.clone();
                Some(ShareOut {
                    user_id: s.shared_with_user_id,
                    username,
                    can_edit: s.can_edit,
                })
            })
            .collect())
    }

    async fn usernames(&self, ids: &[UserId]) -> AppResult<HashMap<UserId, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(self
            .users
            .find_by_ids(ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.username.as_str().to_string()))
            .collect())
    }

    async fn render(&self, request: Request) -> AppResult<RequestOut> {
        let mut rendered = self.render_many(vec![request]).await?;
        rendered
            .pop()
            .ok_or_else(|| AppError::internal("Request rendering produced no output"))
    }

    async fn render_many(&self, requests: Vec<Request>) -> AppResult<Vec<RequestOut>> {
        let owner_ids: Vec<UserId> = requests.iter().map(|r| r.user_id).collect();
        let owners = self.usernames(&owner_ids).await?;

        let mut rendered = Vec::with_capacity(requests.len());
        for request in requests {
            let shared_with = self.share_entries(&request.id).await?;
            rendered.push(RequestOut {
                owner_username: owners.get(&request.user_id).cloned(),
                shared_with,
                request,
            });
        }
        Ok(rendered)
    }
}
