//! 用户实体

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use ryze_auth_core::{ROLE_ADMIN, ROLE_CLIENT, ROLE_DEVELOPER};
use ryze_common::UserId;
use ryze_errors::AppError;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{Email, HashedPassword, Username};

/// 用户类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Client,
    Developer,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Client => ROLE_CLIENT,
            Self::Developer => ROLE_DEVELOPER,
        }
    }
}

impl FromStr for UserType {
    type Err = AppError;

    /// 大小写不敏感
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            ROLE_CLIENT => Ok(Self::Client),
            ROLE_DEVELOPER => Ok(Self::Developer),
            other => Err(AppError::validation(format!(
                "Invalid user_type '{}': expected 'client' or 'developer'",
                other
            ))),
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 用户实体
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
    pub full_name: String,
    pub password_hash: HashedPassword,
    pub user_type: UserType,
    pub is_active: bool,
    pub is_admin: bool,
    pub terms_accepted: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        username: Username,
        email: Email,
        full_name: impl Into<String>,
        password_hash: HashedPassword,
        user_type: UserType,
    ) -> Self {
        Self {
            id: UserId::new(),
            username,
            email,
            full_name: full_name.into(),
            password_hash,
            user_type,
            is_active: true,
            is_admin: false,
            terms_accepted: true,
            created_at: Utc::now(),
        }
    }

    pub fn is_developer(&self) -> bool {
        self.user_type == UserType::Developer
    }

    pub fn is_client(&self) -> bool {
        self.user_type == UserType::Client
    }

    /// 写入令牌的角色列表
    pub fn roles(&self) -> Vec<String> {
        let mut roles = vec![self.user_type.as_str().to_string()];
        if self.is_admin {
            roles.push(ROLE_ADMIN.to_string());
        }
        roles
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(user_type: UserType) -> User {
        User::new(
            Username::new("sample_user").unwrap(),
            Email::new("sample@ryze.ai").unwrap(),
            "Sample User",
            HashedPassword::from_hash("hash".to_string()),
            user_type,
        )
    }

    #[test]
    fn test_user_type_parsing_is_case_insensitive() {
        assert_eq!("Developer".parse::<UserType>().unwrap(), UserType::Developer);
        assert_eq!(" CLIENT ".parse::<UserType>().unwrap(), UserType::Client);
        assert!("manager".parse::<UserType>().is_err());
    }

    #[test]
    fn test_roles_include_admin_flag() {
        let mut user = sample_user(UserType::Client);
        assert_eq!(user.roles(), vec!["client".to_string()]);

        user.is_admin = true;
        assert_eq!(user.roles(), vec!["client".to_string(), "admin".to_string()]);
    }

    #[test]
    fn test_new_user_defaults() {
        let user = sample_user(UserType::Developer);
        assert!(user.is_active);
        assert!(!user.is_admin);
        assert!(user.is_developer());
        assert!(!user.is_client());
    }
}
