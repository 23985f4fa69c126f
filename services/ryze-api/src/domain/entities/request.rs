//! 需求实体与共享记录

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use ryze_common::{ProjectId, RequestId, UserId};
use ryze_errors::AppError;
use serde::{Deserialize, Serialize};

/// 需求状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// 状态流转表
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        use RequestStatus::*;
        matches!(
            (self, next),
            (Open, InProgress)
                | (Open, Cancelled)
                | (InProgress, Completed)
                | (InProgress, Cancelled)
                | (InProgress, Open)
        )
    }
}

impl FromStr for RequestStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(AppError::validation(format!("Invalid request status: {}", other))),
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 需求规则错误
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Cannot change request status from {from} to {to}")]
    InvalidTransition {
        from: RequestStatus,
        to: RequestStatus,
    },

    #[error("Requests containing sensitive data cannot be made public")]
    SensitiveCannotBePublic,

    #[error("Requests containing sensitive data cannot be shared")]
    SensitiveCannotBeShared,
}

impl From<RequestError> for AppError {
    fn from(err: RequestError) -> Self {
        AppError::validation(err.to_string())
    }
}

/// 需求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub title: String,
    pub content: String,
    pub user_id: UserId,
    pub status: RequestStatus,
    pub project_id: Option<ProjectId>,
    pub added_to_project_at: Option<DateTime<Utc>>,
    pub is_public: bool,
    pub contains_sensitive_data: bool,
    pub estimated_budget: Option<f64>,
    pub agreed_amount: Option<f64>,
    pub is_idea: bool,
    pub seeks_collaboration: bool,
    pub collaboration_details: Option<String>,
    pub request_metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Request {
    pub fn new(owner: UserId, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: RequestId::new(),
            title: title.into(),
            content: content.into(),
            user_id: owner,
            status: RequestStatus::Open,
            project_id: None,
            added_to_project_at: None,
            is_public: false,
            contains_sensitive_data: false,
            estimated_budget: None,
            agreed_amount: None,
            is_idea: false,
            seeks_collaboration: false,
            collaboration_details: None,
            request_metadata: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.user_id == *user_id
    }

    /// 所有者、被共享者或公开需求可见
    pub fn can_be_viewed_by(&self, user_id: &UserId, share: Option<&RequestShare>) -> bool {
        self.is_owned_by(user_id) || share.is_some() || self.is_public
    }

    /// 所有者或具备编辑权限的被共享者可编辑
    pub fn can_be_edited_by(&self, user_id: &UserId, share: Option<&RequestShare>) -> bool {
        self.is_owned_by(user_id) || share.is_some_and(|s| s.can_edit)
    }

    /// 按状态流转表变更状态，相同状态视为无操作
    pub fn change_status(&mut self, next: RequestStatus) -> Result<(), RequestError> {
        if self.status == next {
            return Ok(());
        }
        if !self.status.can_transition_to(next) {
            return Err(RequestError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.touch();
        Ok(())
    }

    pub fn set_visibility(&mut self, is_public: bool) -> Result<(), RequestError> {
        if is_public && self.contains_sensitive_data {
            return Err(RequestError::SensitiveCannotBePublic);
        }
        self.is_public = is_public;
        self.touch();
        Ok(())
    }

    pub fn ensure_shareable(&self) -> Result<(), RequestError> {
        if self.contains_sensitive_data {
            return Err(RequestError::SensitiveCannotBeShared);
        }
        Ok(())
    }

    pub fn attach_to_project(&mut self, project_id: ProjectId) {
        self.project_id = Some(project_id);
        self.added_to_project_at = Some(Utc::now());
        self.touch();
    }

    pub fn detach_from_project(&mut self) {
        self.project_id = None;
        self.added_to_project_at = None;
        self.touch();
    }

    /// 达成协议：记录金额并进入进行中
    pub fn record_agreement(&mut self, amount: Option<f64>) -> Result<(), RequestError> {
        self.change_status(RequestStatus::InProgress)?;
        if amount.is_some() {
            self.agreed_amount = amount;
        }
        self.touch();
        Ok(())
    }

    /// 最近活动时间
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

/// 需求共享记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestShare {
    pub request_id: RequestId,
    pub shared_with_user_id: UserId,
    pub can_edit: bool,
    pub created_at: DateTime<Utc>,
    pub viewed_at: Option<DateTime<Utc>>,
}

impl RequestShare {
    pub fn new(request_id: RequestId, shared_with_user_id: UserId, can_edit: bool) -> Self {
        Self {
            request_id,
            shared_with_user_id,
            can_edit,
            created_at: Utc::now(),
            viewed_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        use RequestStatus::*;
        assert!(Open.can_transition_to(InProgress));
        assert!(Open.can_transition_to(Cancelled));
        assert!(!Open.can_transition_to(Completed));
        assert!(InProgress.can_transition_to(Completed));
        assert!(InProgress.can_transition_to(Open));
        for terminal in [Completed, Cancelled] {
            for next in [Open, InProgress, Completed, Cancelled] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_change_status_same_is_noop() {
        let mut request = Request::new(UserId::new(), "t", "c");
        request.change_status(RequestStatus::Open).unwrap();
        assert!(request.updated_at.is_none());
    }

    #[test]
    fn test_terminal_status_rejects_change() {
        let mut request = Request::new(UserId::new(), "t", "c");
        request.change_status(RequestStatus::Cancelled).unwrap();
        let err = request.change_status(RequestStatus::Open).unwrap_err();
        assert_eq!(
            err,
            RequestError::InvalidTransition {
                from: RequestStatus::Cancelled,
                to: RequestStatus::Open
            }
        );
    }

    #[test]
    fn test_sensitive_request_cannot_go_public_or_be_shared() {
        let mut request = Request::new(UserId::new(), "t", "c");
        request.contains_sensitive_data = true;
        assert_eq!(
            request.set_visibility(true),
            Err(RequestError::SensitiveCannotBePublic)
        );
        assert!(request.set_visibility(false).is_ok());
        assert_eq!(
            request.ensure_shareable(),
            Err(RequestError::SensitiveCannotBeShared)
        );
    }

    #[test]
    fn test_access_rules() {
        let owner = UserId::new();
        let friend = UserId::new();
        let stranger = UserId::new();
        let request = Request::new(owner, "t", "c");
        let read_share = RequestShare::new(request.id, friend, false);

        assert!(request.can_be_viewed_by(&owner, None));
        assert!(request.can_be_viewed_by(&friend, Some(&read_share)));
        assert!(!request.can_be_viewed_by(&stranger, None));
        assert!(!request.can_be_edited_by(&friend, Some(&read_share)));

        let edit_share = RequestShare::new(request.id, friend, true);
        assert!(request.can_be_edited_by(&friend, Some(&edit_share)));
    }

    #[test]
    fn test_agreement_moves_open_request_in_progress() {
        let mut request = Request::new(UserId::new(), "t", "c");
        request.record_agreement(Some(1500.0)).unwrap();
        assert_eq!(request.status, RequestStatus::InProgress);
        assert_eq!(request.agreed_amount, Some(1500.0));

        request.change_status(RequestStatus::Completed).unwrap();
        assert!(request.record_agreement(Some(10.0)).is_err());
        assert_eq!(request.agreed_amount, Some(1500.0));
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("in_progress".parse::<RequestStatus>().unwrap(), RequestStatus::InProgress);
        assert!("done".parse::<RequestStatus>().is_err());
    }
}
