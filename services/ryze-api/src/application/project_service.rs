//! 项目：客户用来归档需求的容器

use std::sync::Arc;

use chrono::{DateTime, Utc};
use ryze_common::{ProjectId, UserId};
use ryze_errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::entities::{
    Conversation, ConversationStatus, Project, Request, RequestStatus, User,
};
use crate::domain::repositories::{ConversationRepository, ProjectRepository, RequestRepository};

use super::dto::{MAX_NAME_LEN, require_bounded};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

/// 项目下需求的统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestStats {
    pub total: usize,
    pub open: usize,
    pub completed: usize,
    pub total_budget: f64,
    pub agreed_amount: f64,
}

impl RequestStats {
    pub fn from_requests(requests: &[Request]) -> Self {
        requests.iter().fold(Self::default(), |mut stats, r| {
            stats.total += 1;
            match r.status {
                RequestStatus::Open => stats.open += 1,
                RequestStatus::Completed => stats.completed += 1,
                _ => {}
            }
            stats.total_budget += r.estimated_budget.unwrap_or(0.0);
            stats.agreed_amount += r.agreed_amount.unwrap_or(0.0);
            stats
        })
    }
}

/// 项目下会话的统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationStats {
    pub total: usize,
    pub active: usize,
    pub negotiating: usize,
    pub agreed: usize,
}

impl ConversationStats {
    pub fn from_conversations(conversations: &[Conversation]) -> Self {
        conversations.iter().fold(Self::default(), |mut stats, c| {
            stats.total += 1;
            match c.status {
                ConversationStatus::Active => stats.active += 1,
                ConversationStatus::Negotiating => stats.negotiating += 1,
                ConversationStatus::Agreed => stats.agreed += 1,
                ConversationStatus::Completed => {}
            }
            stats
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSummary {
    #[serde(flatten)]
    pub project: Project,
    pub request_stats: RequestStats,
    pub conversation_stats: ConversationStats,
    pub last_activity: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub requests: Vec<Request>,
}

pub struct ProjectService {
    projects: Arc<dyn ProjectRepository>,
    requests: Arc<dyn RequestRepository>,
    conversations: Arc<dyn ConversationRepository>,
}

impl ProjectService {
    pub fn new(
        projects: Arc<dyn ProjectRepository>,
        requests: Arc<dyn RequestRepository>,
        conversations: Arc<dyn ConversationRepository>,
    ) -> Self {
        Self {
            projects,
            requests,
            conversations,
        }
    }

    pub async fn create(&self, owner: &User, input: CreateProject) -> AppResult<Project> {
        if !owner.is_client() {
            return Err(AppError::forbidden("Only clients can create projects"));
        }
        let name = require_bounded(&input.name, "Project name", MAX_NAME_LEN)?;
        let project = Project::new(owner.id, name, input.description);
        self.projects.save(&project).await?;

        info!(project_id = %project.id, user_id = %owner.id, "Project created");
        Ok(project)
    }

    pub async fn list(&self, owner: &UserId) -> AppResult<Vec<ProjectSummary>> {
        let projects = self.projects.list_by_owner(owner).await?;
        let mut summaries = Vec::with_capacity(projects.len());

        for project in projects {
            let requests = self.requests.list_by_project(&project.id).await?;
            let mut conversations = Vec::new();
            for request in &requests {
                conversations.extend(self.conversations.list_by_request(&request.id).await?);
            }

            let last_activity = requests
                .iter()
                .map(Request::last_activity)
                .chain(conversations.iter().map(Conversation::last_activity))
                .fold(project.updated_at.unwrap_or(project.created_at), |a, b| {
                    a.max(b)
                });

            summaries.push(ProjectSummary {
                request_stats: RequestStats::from_requests(&requests),
                conversation_stats: ConversationStats::from_conversations(&conversations),
                last_activity,
                project,
            });
        }
        Ok(summaries)
    }

    /// 查找调用者拥有的项目，非所有者同样返回 404
    pub async fn owned(&self, id: &ProjectId, owner: &UserId) -> AppResult<Project> {
        self.projects
            .find_by_id(id)
            .await?
            .filter(|p| p.is_owned_by(owner))
            .ok_or_else(|| AppError::not_found("Project not found"))
    }

    pub async fn get(&self, id: &ProjectId, owner: &UserId) -> AppResult<ProjectDetail> {
        let project = self.owned(id, owner).await?;
        let requests = self.requests.list_by_project(&project.id).await?;
        Ok(ProjectDetail { project, requests })
    }

    pub async fn update(
        &self,
        id: &ProjectId,
        owner: &UserId,
        input: UpdateProject,
    ) -> AppResult<Project> {
        let mut project = self.owned(id, owner).await?;

        if let Some(name) = input.name {
            project.name = require_bounded(&name, "Project name", MAX_NAME_LEN)?;
        }
        if input.description.is_some() {
            project.description = input.description;
        }
        if let Some(is_active) = input.is_active {
            project.is_active = is_active;
        }
        project.touch();

        self.projects.update(&project).await?;
        Ok(project)
    }

    pub async fn delete(&self, id: &ProjectId, owner: &UserId) -> AppResult<()> {
        let project = self.owned(id, owner).await?;
        if !self.requests.list_by_project(&project.id).await?.is_empty() {
            return Err(AppError::validation(
                "Cannot delete project with existing requests",
            ));
        }
        self.projects.delete(&project.id).await?;
        info!(project_id = %project.id, "Project deleted");
        Ok(())
    }
}
