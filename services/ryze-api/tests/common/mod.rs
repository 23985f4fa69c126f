//! 集成测试公共设施：内存仓储与路由驱动

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use chrono::{DateTime, Utc};
use ryze_api::api::{AppState, Repositories, RouterOptions, build_router};
use ryze_api::domain::entities::{
    ClientProfile, Comment, CommentVote, Conversation, ConversationMessage, DeveloperProfile,
    DeveloperRating, Feedback, Project, Request as RyzeRequest, RequestShare, Runbook,
    RunbookExecution, SnaggedRequest, User,
};
use ryze_api::domain::repositories::{
    CommentRepository, ConversationRepository, FeedbackRepository, ProfileRepository,
    ProjectRepository, RatingRepository, RequestRepository, RunbookRepository, SnagRepository,
    UserRepository,
};
use ryze_api::domain::value_objects::{Email, Username};
use ryze_auth_core::TokenService;
use ryze_common::{
    CommentId, ConversationId, Pagination, ProjectId, RequestId, RunbookId, UserId,
};
use ryze_config::RunbookConfig;
use ryze_errors::{AppError, AppResult};
use serde_json::Value;
use tower::ServiceExt;

pub const PASSWORD: &str = "Sup3r-Secret-Pass";
const JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";

fn page_of<T: Clone>(items: &[T], page: Pagination) -> Vec<T> {
    items
        .iter()
        .skip(page.skip as usize)
        .take(page.limit as usize)
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// 用户
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn promote_admin(&self, username: &str) {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.username.as_str() == username) {
            user.is_admin = true;
        }
    }

    pub fn deactivate(&self, username: &str) {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.username.as_str() == username) {
            user.deactivate();
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == *id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username.as_str() == username)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> AppResult<Vec<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn save(&self, user: &User) -> AppResult<()> {
        self.users.lock().unwrap().push(user.clone());
        Ok(())
    }

    async fn exists_by_username(&self, username: &Username) -> AppResult<bool> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .any(|u| u.username.as_str().eq_ignore_ascii_case(username.as_str())))
    }

    async fn exists_by_email(&self, email: &Email) -> AppResult<bool> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .any(|u| u.email.as_str().eq_ignore_ascii_case(email.as_str())))
    }

    async fn search_by_username(
        &self,
        query: &str,
        exclude: &UserId,
        limit: i64,
    ) -> AppResult<Vec<User>> {
        let query = query.to_lowercase();
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.id != *exclude && u.username.as_str().to_lowercase().contains(&query))
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// 资料
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryProfileRepository {
    developers: Mutex<Vec<DeveloperProfile>>,
    clients: Mutex<Vec<ClientProfile>>,
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn find_developer(&self, user_id: &UserId) -> AppResult<Option<DeveloperProfile>> {
        Ok(self
            .developers
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.user_id == *user_id)
            .cloned())
    }

    async fn save_developer(&self, profile: &DeveloperProfile) -> AppResult<()> {
        self.developers.lock().unwrap().push(profile.clone());
        Ok(())
    }

    async fn update_developer(&self, profile: &DeveloperProfile) -> AppResult<()> {
        let mut developers = self.developers.lock().unwrap();
        if let Some(existing) = developers.iter_mut().find(|p| p.user_id == profile.user_id) {
            *existing = profile.clone();
        }
        Ok(())
    }

    async fn list_public_developers(&self, page: Pagination) -> AppResult<Vec<DeveloperProfile>> {
        let mut public: Vec<DeveloperProfile> = self
            .developers
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.is_public)
            .cloned()
            .collect();
        public.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page_of(&public, page))
    }

    async fn find_client(&self, user_id: &UserId) -> AppResult<Option<ClientProfile>> {
        Ok(self
            .clients
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.user_id == *user_id)
            .cloned())
    }

    async fn save_client(&self, profile: &ClientProfile) -> AppResult<()> {
        self.clients.lock().unwrap().push(profile.clone());
        Ok(())
    }

    async fn update_client(&self, profile: &ClientProfile) -> AppResult<()> {
        let mut clients = self.clients.lock().unwrap();
        if let Some(existing) = clients.iter_mut().find(|p| p.user_id == profile.user_id) {
            *existing = profile.clone();
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// 项目
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryProjectRepository {
    projects: Mutex<Vec<Project>>,
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn find_by_id(&self, id: &ProjectId) -> AppResult<Option<Project>> {
        Ok(self.projects.lock().unwrap().iter().find(|p| p.id == *id).cloned())
    }

    async fn list_by_owner(&self, owner: &UserId) -> AppResult<Vec<Project>> {
        let mut owned: Vec<Project> = self
            .projects
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.user_id == *owner)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn save(&self, project: &Project) -> AppResult<()> {
        self.projects.lock().unwrap().push(project.clone());
        Ok(())
    }

    async fn update(&self, project: &Project) -> AppResult<()> {
        let mut projects = self.projects.lock().unwrap();
        if let Some(existing) = projects.iter_mut().find(|p| p.id == project.id) {
            *existing = project.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: &ProjectId) -> AppResult<()> {
        self.projects.lock().unwrap().retain(|p| p.id != *id);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// 需求与共享
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryRequestRepository {
    requests: Mutex<Vec<RyzeRequest>>,
    shares: Mutex<Vec<RequestShare>>,
}

impl InMemoryRequestRepository {
    fn newest_first(mut requests: Vec<RyzeRequest>) -> Vec<RyzeRequest> {
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        requests
    }
}

#[async_trait]
impl RequestRepository for InMemoryRequestRepository {
    async fn find_by_id(&self, id: &RequestId) -> AppResult<Option<RyzeRequest>> {
        Ok(self.requests.lock().unwrap().iter().find(|r| r.id == *id).cloned())
    }

    async fn save(&self, request: &RyzeRequest) -> AppResult<()> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn update(&self, request: &RyzeRequest) -> AppResult<()> {
        let mut requests = self.requests.lock().unwrap();
        if let Some(existing) = requests.iter_mut().find(|r| r.id == request.id) {
            *existing = request.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: &RequestId) -> AppResult<()> {
        self.requests.lock().unwrap().retain(|r| r.id != *id);
        self.shares.lock().unwrap().retain(|s| s.request_id != *id);
        Ok(())
    }

    async fn list_by_owner(
        &self,
        owner: &UserId,
        project_id: Option<ProjectId>,
    ) -> AppResult<Vec<RyzeRequest>> {
        let owned = self
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == *owner)
            .filter(|r| project_id.is_none() || r.project_id == project_id)
            .cloned()
            .collect();
        Ok(Self::newest_first(owned))
    }

    async fn list_by_project(&self, project_id: &ProjectId) -> AppResult<Vec<RyzeRequest>> {
        let in_project = self
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.project_id == Some(*project_id))
            .cloned()
            .collect();
        Ok(Self::newest_first(in_project))
    }

    async fn list_public(&self, page: Pagination) -> AppResult<Vec<RyzeRequest>> {
        let public = Self::newest_first(
            self.requests
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.is_public)
                .cloned()
                .collect(),
        );
        Ok(page_of(&public, page))
    }

    async fn list_shared_with(&self, user_id: &UserId) -> AppResult<Vec<RyzeRequest>> {
        let ids: Vec<RequestId> = self
            .shares
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.shared_with_user_id == *user_id)
            .map(|s| s.request_id)
            .collect();
        let shared = self
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| ids.contains(&r.id))
            .cloned()
            .collect();
        Ok(Self::newest_first(shared))
    }

    async fn find_share(
        &self,
        request_id: &RequestId,
        user_id: &UserId,
    ) -> AppResult<Option<RequestShare>> {
        Ok(self
            .shares
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.request_id == *request_id && s.shared_with_user_id == *user_id)
            .cloned())
    }

    async fn list_shares(&self, request_id: &RequestId) -> AppResult<Vec<RequestShare>> {
        Ok(self
            .shares
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.request_id == *request_id)
            .cloned()
            .collect())
    }

    async fn save_share(&self, share: &RequestShare) -> AppResult<()> {
        let mut shares = self.shares.lock().unwrap();
        if shares
            .iter()
            .any(|s| s.request_id == share.request_id && s.shared_with_user_id == share.shared_with_user_id)
        {
            return Err(AppError::conflict("Share already exists"));
        }
        shares.push(share.clone());
        Ok(())
    }

    async fn delete_share(&self, request_id: &RequestId, user_id: &UserId) -> AppResult<bool> {
        let mut shares = self.shares.lock().unwrap();
        let before = shares.len();
        shares.retain(|s| !(s.request_id == *request_id && s.shared_with_user_id == *user_id));
        Ok(shares.len() < before)
    }

    async fn mark_share_viewed(
        &self,
        request_id: &RequestId,
        user_id: &UserId,
        viewed_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut shares = self.shares.lock().unwrap();
        if let Some(share) = shares.iter_mut().find(|s| {
            s.request_id == *request_id && s.shared_with_user_id == *user_id && s.viewed_at.is_none()
        }) {
            share.viewed_at = Some(viewed_at);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// 评论
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryCommentRepository {
    comments: Mutex<Vec<Comment>>,
    votes: Mutex<Vec<CommentVote>>,
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn find_by_id(&self, id: &CommentId) -> AppResult<Option<Comment>> {
        Ok(self.comments.lock().unwrap().iter().find(|c| c.id == *id).cloned())
    }

    async fn save(&self, comment: &Comment) -> AppResult<()> {
        self.comments.lock().unwrap().push(comment.clone());
        Ok(())
    }

    async fn list_by_request(&self, request_id: &RequestId) -> AppResult<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.request_id == *request_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }

    async fn delete_with_replies(&self, id: &CommentId) -> AppResult<()> {
        let mut comments = self.comments.lock().unwrap();
        let mut doomed = vec![*id];
        let mut cursor = 0;
        while cursor < doomed.len() {
            let parent = doomed[cursor];
            doomed.extend(
                comments
                    .iter()
                    .filter(|c| c.parent_id == Some(parent))
                    .map(|c| c.id),
            );
            cursor += 1;
        }
        comments.retain(|c| !doomed.contains(&c.id));
        self.votes
            .lock()
            .unwrap()
            .retain(|v| !doomed.contains(&v.comment_id));
        Ok(())
    }

    async fn list_votes_for_request(&self, request_id: &RequestId) -> AppResult<Vec<CommentVote>> {
        let ids: Vec<CommentId> = self
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.request_id == *request_id)
            .map(|c| c.id)
            .collect();
        Ok(self
            .votes
            .lock()
            .unwrap()
            .iter()
            .filter(|v| ids.contains(&v.comment_id))
            .cloned()
            .collect())
    }

    async fn upsert_vote(&self, vote: &CommentVote) -> AppResult<()> {
        let mut votes = self.votes.lock().unwrap();
        match votes
            .iter_mut()
            .find(|v| v.user_id == vote.user_id && v.comment_id == vote.comment_id)
        {
            Some(existing) => existing.vote_type = vote.vote_type,
            None => votes.push(vote.clone()),
        }
        Ok(())
    }

    async fn delete_vote(&self, user_id: &UserId, comment_id: &CommentId) -> AppResult<()> {
        self.votes
            .lock()
            .unwrap()
            .retain(|v| !(v.user_id == *user_id && v.comment_id == *comment_id));
        Ok(())
    }

    async fn vote_count(&self, comment_id: &CommentId) -> AppResult<i64> {
        Ok(self
            .votes
            .lock()
            .unwrap()
            .iter()
            .filter(|v| v.comment_id == *comment_id)
            .map(|v| i64::from(v.vote_type))
            .sum())
    }
}

// ---------------------------------------------------------------------------
// 会话
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryConversationRepository {
    conversations: Mutex<Vec<Conversation>>,
    messages: Mutex<Vec<ConversationMessage>>,
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn find_by_id(&self, id: &ConversationId) -> AppResult<Option<Conversation>> {
        Ok(self
            .conversations
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == *id)
            .cloned())
    }

    async fn find_by_request_and_starter(
        &self,
        request_id: &RequestId,
        starter: &UserId,
    ) -> AppResult<Option<Conversation>> {
        Ok(self
            .conversations
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.request_id == *request_id && c.starter_user_id == *starter)
            .cloned())
    }

    async fn save(&self, conversation: &Conversation) -> AppResult<()> {
        self.conversations.lock().unwrap().push(conversation.clone());
        Ok(())
    }

    async fn update(&self, conversation: &Conversation) -> AppResult<()> {
        let mut conversations = self.conversations.lock().unwrap();
        if let Some(existing) = conversations.iter_mut().find(|c| c.id == conversation.id) {
            *existing = conversation.clone();
        }
        Ok(())
    }

    async fn list_for_user(&self, user_id: &UserId) -> AppResult<Vec<Conversation>> {
        let mut mine: Vec<Conversation> = self
            .conversations
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.is_participant(user_id))
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.last_activity().cmp(&a.last_activity()));
        Ok(mine)
    }

    async fn list_by_request(&self, request_id: &RequestId) -> AppResult<Vec<Conversation>> {
        Ok(self
            .conversations
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.request_id == *request_id)
            .cloned()
            .collect())
    }

    async fn add_message(&self, message: &ConversationMessage) -> AppResult<()> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn list_messages(
        &self,
        conversation_id: &ConversationId,
    ) -> AppResult<Vec<ConversationMessage>> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.conversation_id == *conversation_id)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// 抢单、评分、反馈、运维手册
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemorySnagRepository {
    snags: Mutex<Vec<SnaggedRequest>>,
}

#[async_trait]
impl SnagRepository for InMemorySnagRepository {
    async fn find(
        &self,
        request_id: &RequestId,
        developer_id: &UserId,
    ) -> AppResult<Option<SnaggedRequest>> {
        Ok(self
            .snags
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.request_id == *request_id && s.developer_id == *developer_id)
            .cloned())
    }

    async fn save(&self, snag: &SnaggedRequest) -> AppResult<()> {
        self.snags.lock().unwrap().push(snag.clone());
        Ok(())
    }

    async fn update(&self, snag: &SnaggedRequest) -> AppResult<()> {
        let mut snags = self.snags.lock().unwrap();
        if let Some(existing) = snags.iter_mut().find(|s| s.id == snag.id) {
            *existing = snag.clone();
        }
        Ok(())
    }

    async fn list_active_by_developer(
        &self,
        developer_id: &UserId,
    ) -> AppResult<Vec<SnaggedRequest>> {
        Ok(self
            .snags
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.developer_id == *developer_id && s.is_active)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryRatingRepository {
    ratings: Mutex<Vec<DeveloperRating>>,
}

#[async_trait]
impl RatingRepository for InMemoryRatingRepository {
    async fn find(&self, developer: &UserId, rater: &UserId) -> AppResult<Option<DeveloperRating>> {
        Ok(self
            .ratings
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.developer_user_id == *developer && r.user_id == *rater)
            .cloned())
    }

    async fn save(&self, rating: &DeveloperRating) -> AppResult<()> {
        self.ratings.lock().unwrap().push(rating.clone());
        Ok(())
    }

    async fn update(&self, rating: &DeveloperRating) -> AppResult<()> {
        let mut ratings = self.ratings.lock().unwrap();
        if let Some(existing) = ratings.iter_mut().find(|r| r.id == rating.id) {
            *existing = rating.clone();
        }
        Ok(())
    }

    async fn list_by_developer(&self, developer: &UserId) -> AppResult<Vec<DeveloperRating>> {
        Ok(self
            .ratings
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.developer_user_id == *developer)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryFeedbackRepository {
    feedback: Mutex<Vec<Feedback>>,
}

#[async_trait]
impl FeedbackRepository for InMemoryFeedbackRepository {
    async fn save(&self, feedback: &Feedback) -> AppResult<()> {
        self.feedback.lock().unwrap().push(feedback.clone());
        Ok(())
    }

    async fn list_all(&self) -> AppResult<Vec<Feedback>> {
        let mut all = self.feedback.lock().unwrap().clone();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }
}

#[derive(Default)]
pub struct InMemoryRunbookRepository {
    runbooks: Mutex<HashMap<RunbookId, Runbook>>,
    executions: Mutex<Vec<RunbookExecution>>,
}

#[async_trait]
impl RunbookRepository for InMemoryRunbookRepository {
    async fn find_by_id(&self, id: &RunbookId) -> AppResult<Option<Runbook>> {
        Ok(self.runbooks.lock().unwrap().get(id).cloned())
    }

    async fn list_by_owner(&self, owner: &UserId, tag: Option<String>) -> AppResult<Vec<Runbook>> {
        let mut owned: Vec<Runbook> = self
            .runbooks
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.user_id == *owner)
            .filter(|r| tag.as_deref().is_none_or(|t| r.has_tag(t)))
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn save(&self, runbook: &Runbook) -> AppResult<()> {
        self.runbooks
            .lock()
            .unwrap()
            .insert(runbook.id, runbook.clone());
        Ok(())
    }

    async fn update(&self, runbook: &Runbook) -> AppResult<()> {
        self.save(runbook).await
    }

    async fn delete(&self, id: &RunbookId) -> AppResult<()> {
        self.runbooks.lock().unwrap().remove(id);
        self.executions
            .lock()
            .unwrap()
            .retain(|e| e.runbook_id != *id);
        Ok(())
    }

    async fn save_execution(&self, execution: &RunbookExecution) -> AppResult<()> {
        self.executions.lock().unwrap().push(execution.clone());
        Ok(())
    }

    async fn list_executions(
        &self,
        runbook_id: &RunbookId,
        limit: i64,
    ) -> AppResult<Vec<RunbookExecution>> {
        let mut history: Vec<RunbookExecution> = self
            .executions
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.runbook_id == *runbook_id)
            .cloned()
            .collect();
        history.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        history.truncate(limit as usize);
        Ok(history)
    }
}

// ---------------------------------------------------------------------------
// 路由驱动
// ---------------------------------------------------------------------------

pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
    pub text: String,
}

pub struct TestApp {
    router: Router,
    pub users: Arc<InMemoryUserRepository>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_runbook_config(RunbookConfig::default())
    }

    pub fn with_runbook_config(runbook_config: RunbookConfig) -> Self {
        let users = Arc::new(InMemoryUserRepository::default());
        let repos = Repositories {
            users: users.clone(),
            profiles: Arc::new(InMemoryProfileRepository::default()),
            projects: Arc::new(InMemoryProjectRepository::default()),
            requests: Arc::new(InMemoryRequestRepository::default()),
            comments: Arc::new(InMemoryCommentRepository::default()),
            conversations: Arc::new(InMemoryConversationRepository::default()),
            snags: Arc::new(InMemorySnagRepository::default()),
            ratings: Arc::new(InMemoryRatingRepository::default()),
            feedback: Arc::new(InMemoryFeedbackRepository::default()),
            runbooks: Arc::new(InMemoryRunbookRepository::default()),
        };
        let tokens = TokenService::new(JWT_SECRET, 1800, 604_800, "ryze", "ryze-api");
        let state = AppState::new(
            repos,
            tokens,
            &runbook_config,
            ryze_telemetry::detached_metrics_handle(),
        );
        let router = build_router(
            state,
            &RouterOptions {
                body_limit_bytes: 1024 * 1024,
                ..Default::default()
            },
        );
        Self { router, users }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8_lossy(&bytes).to_string();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Response {
            status,
            headers,
            body,
            text,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Response {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> Response {
        self.send(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> Response {
        self.send(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Response {
        self.send(Method::DELETE, uri, token, None).await
    }

    pub async fn register(&self, username: &str, user_type: &str) -> Response {
        self.post(
            "/auth/register",
            None,
            serde_json::json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "full_name": format!("{} Tester", username),
                "password": PASSWORD,
                "user_type": user_type,
                "terms_accepted": true,
            }),
        )
        .await
    }

    pub async fn login(&self, username: &str) -> Response {
        self.post(
            "/auth/login",
            None,
            serde_json::json!({ "username": username, "password": PASSWORD }),
        )
        .await
    }

    /// 注册并登录，返回 (用户 ID, 访问令牌)
    pub async fn signup(&self, username: &str, user_type: &str) -> (String, String) {
        let registered = self.register(username, user_type).await;
        assert_eq!(registered.status, StatusCode::CREATED, "{}", registered.text);
        let id = registered.body["id"].as_str().unwrap().to_string();
        let token = self.access_token(username).await;
        (id, token)
    }

    pub async fn access_token(&self, username: &str) -> String {
        let login = self.login(username).await;
        assert_eq!(login.status, StatusCode::OK, "{}", login.text);
        login.body["access_token"].as_str().unwrap().to_string()
    }

    /// 创建一个需求，返回其 ID
    pub async fn create_request(&self, token: &str, body: Value) -> String {
        let created = self.post("/requests", Some(token), body).await;
        assert_eq!(created.status, StatusCode::CREATED, "{}", created.text);
        created.body["id"].as_str().unwrap().to_string()
    }
}
