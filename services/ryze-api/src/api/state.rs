//! 应用共享状态

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use ryze_auth_core::TokenService;
use ryze_common::HealthCheck;
use ryze_config::RunbookConfig;
use sqlx::PgPool;

use crate::application::{
    AccountService, CommentService, ConversationService, FeedbackService, ProfileService,
    ProjectService, RatingService, RequestService, RunbookService, SnagService,
};
use crate::domain::repositories::{
    CommentRepository, ConversationRepository, FeedbackRepository, ProfileRepository,
    ProjectRepository, RatingRepository, RequestRepository, RunbookRepository, SnagRepository,
    UserRepository,
};
use crate::infrastructure::executor::RunbookExecutor;
use crate::infrastructure::persistence::{
    PostgresCommentRepository, PostgresConversationRepository, PostgresFeedbackRepository,
    PostgresProfileRepository, PostgresProjectRepository, PostgresRatingRepository,
    PostgresRequestRepository, PostgresRunbookRepository, PostgresSnagRepository,
    PostgresUserRepository,
};

/// 全部仓储
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub projects: Arc<dyn ProjectRepository>,
    pub requests: Arc<dyn RequestRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub conversations: Arc<dyn ConversationRepository>,
    pub snags: Arc<dyn SnagRepository>,
    pub ratings: Arc<dyn RatingRepository>,
    pub feedback: Arc<dyn FeedbackRepository>,
    pub runbooks: Arc<dyn RunbookRepository>,
}

impl Repositories {
    /// 基于同一个连接池的 PostgreSQL 实现
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            profiles: Arc::new(PostgresProfileRepository::new(pool.clone())),
            projects: Arc::new(PostgresProjectRepository::new(pool.clone())),
            requests: Arc::new(PostgresRequestRepository::new(pool.clone())),
            comments: Arc::new(PostgresCommentRepository::new(pool.clone())),
            conversations: Arc::new(PostgresConversationRepository::new(pool.clone())),
            snags: Arc::new(PostgresSnagRepository::new(pool.clone())),
            ratings: Arc::new(PostgresRatingRepository::new(pool.clone())),
            feedback: Arc::new(PostgresFeedbackRepository::new(pool.clone())),
            runbooks: Arc::new(PostgresRunbookRepository::new(pool)),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub profiles: Arc<ProfileService>,
    pub projects: Arc<ProjectService>,
    pub requests: Arc<RequestService>,
    pub comments: Arc<CommentService>,
    pub conversations: Arc<ConversationService>,
    pub snags: Arc<SnagService>,
    pub ratings: Arc<RatingService>,
    pub feedback: Arc<FeedbackService>,
    pub runbooks: Arc<RunbookService>,
    pub health_checks: Arc<Vec<Arc<dyn HealthCheck>>>,
    pub metrics: PrometheusHandle,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        tokens: TokenService,
        runbook_config: &RunbookConfig,
        metrics: PrometheusHandle,
    ) -> Self {
        let conversations = Arc::new(ConversationService::new(
            repos.conversations.clone(),
            repos.requests.clone(),
            repos.users.clone(),
        ));

        Self {
            accounts: Arc::new(AccountService::new(repos.users.clone(), tokens)),
            profiles: Arc::new(ProfileService::new(
                repos.users.clone(),
                repos.profiles.clone(),
            )),
            projects: Arc::new(ProjectService::new(
                repos.projects.clone(),
                repos.requests.clone(),
                repos.conversations.clone(),
            )),
            requests: Arc::new(RequestService::new(
                repos.requests.clone(),
                repos.users.clone(),
                repos.projects.clone(),
            )),
            comments: Arc::new(CommentService::new(
                repos.comments.clone(),
                repos.requests.clone(),
                repos.users.clone(),
            )),
            snags: Arc::new(SnagService::new(
                repos.snags.clone(),
                repos.requests.clone(),
                repos.users.clone(),
                conversations.clone(),
            )),
            conversations,
            ratings: Arc::new(RatingService::new(
                repos.ratings.clone(),
                repos.profiles.clone(),
            )),
            feedback: Arc::new(FeedbackService::new(repos.feedback.clone())),
            runbooks: Arc::new(RunbookService::new(
                repos.runbooks.clone(),
                RunbookExecutor::new(runbook_config),
                runbook_config,
            )),
            health_checks: Arc::new(Vec::new()),
            metrics,
        }
    }

    /// 注册就绪探针检查的依赖
    pub fn with_health_check(mut self, check: Arc<dyn HealthCheck>) -> Self {
        let mut checks: Vec<Arc<dyn HealthCheck>> = self.health_checks.iter().cloned().collect();
        checks.push(check);
        self.health_checks = Arc::new(checks);
        self
    }
}
