//! 对外输出的数据结构

use chrono::{DateTime, Utc};
use ryze_common::UserId;
use serde::{Deserialize, Serialize};

use crate::domain::entities::{User, UserType};

/// 用户输出（不含密码哈希）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserOut {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub user_type: UserType,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserOut {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.as_str().to_string(),
            email: user.email.as_str().to_string(),
            full_name: user.full_name.clone(),
            user_type: user.user_type,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

/// 用户摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

impl UserSummary {
    pub fn brief(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.as_str().to_string(),
            full_name: None,
        }
    }

    pub fn with_full_name(user: &User) -> Self {
        Self {
            full_name: Some(user.full_name.clone()),
            ..Self::brief(user)
        }
    }
}

/// 通用消息响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageOut {
    pub message: String,
}

impl MessageOut {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// 非空校验
pub(crate) fn require_non_empty(value: &str, field: &str) -> ryze_errors::AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ryze_errors::AppError::validation(format!(
            "{} cannot be empty",
            field
        )));
    }
    Ok(value.to_string())
}

/// VARCHAR(255) 列的长度上限
pub(crate) const MAX_NAME_LEN: usize = 255;

/// 长度按字符计，与 PostgreSQL VARCHAR(n) 一致
pub(crate) fn ensure_max_len(value: &str, field: &str, max: usize) -> ryze_errors::AppResult<()> {
    if value.chars().count() > max {
        return Err(ryze_errors::AppError::validation(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}

/// 非空且不超过长度上限
pub(crate) fn require_bounded(
    value: &str,
    field: &str,
    max: usize,
) -> ryze_errors::AppResult<String> {
    let value = require_non_empty(value, field)?;
    ensure_max_len(&value, field, max)?;
    Ok(value)
}
