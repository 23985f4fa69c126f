//! 需求评论与投票

use chrono::{DateTime, Utc};
use ryze_common::{CommentId, RequestId, UserId};
use ryze_errors::AppError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub request_id: RequestId,
    pub user_id: UserId,
    pub parent_id: Option<CommentId>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Comment {
    pub fn new(
        request_id: RequestId,
        user_id: UserId,
        parent_id: Option<CommentId>,
        content: &str,
    ) -> Result<Self, AppError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::validation("Comment content cannot be empty"));
        }
        Ok(Self {
            id: CommentId::new(),
            request_id,
            user_id,
            parent_id,
            content: content.to_string(),
            created_at: Utc::now(),
            updated_at: None,
        })
    }
}

/// 投票方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    /// -1 / 1 映射为投票，0 表示撤销
    pub fn from_value(value: i16) -> Result<Option<Self>, AppError> {
        match value {
            1 => Ok(Some(Self::Up)),
            -1 => Ok(Some(Self::Down)),
            0 => Ok(None),
            other => Err(AppError::validation(format!(
                "vote_type must be -1, 0 or 1 (got {})",
                other
            ))),
        }
    }

    pub fn value(&self) -> i16 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentVote {
    pub user_id: UserId,
    pub comment_id: CommentId,
    pub vote_type: i16,
}
