//! 账户：注册、登录、刷新令牌、令牌认证

use std::sync::Arc;

use ryze_auth_core::{Claims, TokenPair, TokenService};
use ryze_errors::{AppError, AppResult};
use serde::Deserialize;
use tracing::{info, warn};

use crate::domain::entities::{User, UserType};
use crate::domain::repositories::UserRepository;
use crate::domain::value_objects::{Email, HashedPassword, Username};

use super::dto::{MAX_NAME_LEN, require_bounded};

/// 注册命令
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterCommand {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub user_type: String,
    #[serde(default)]
    pub terms_accepted: bool,
}

pub struct AccountService {
    users: Arc<dyn UserRepository>,
    tokens: TokenService,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: TokenService) -> Self {
        Self { users, tokens }
    }

    pub async fn register(&self, cmd: RegisterCommand) -> AppResult<User> {
        if !cmd.terms_accepted {
            return Err(AppError::validation(
                "You must accept the terms and conditions",
            ));
        }

        let username = Username::new(cmd.username)?;
        let email = Email::new(cmd.email)?;
        let full_name = require_bounded(&cmd.full_name, "Full name", MAX_NAME_LEN)?;
        let user_type: UserType = cmd.user_type.parse()?;

        if self.users.exists_by_username(&username).await? {
            return Err(AppError::conflict("Username already taken"));
        }
        if self.users.exists_by_email(&email).await? {
            return Err(AppError::conflict("Email already registered"));
        }

        let password_hash = HashedPassword::from_plain(&cmd.password)?;
        let user = User::new(username, email, full_name, password_hash, user_type);
        self.users.save(&user).await?;

        info!(user_id = %user.id, user_type = %user.user_type, "User registered");
        Ok(user)
    }

    pub async fn login(&self, username: &str, password: &str) -> AppResult<TokenPair> {
        let user = match self.users.find_by_username(username.trim()).await? {
            Some(user) if user.password_hash.verify(password)? => user,
            _ => {
                metrics::counter!("ryze_auth_logins_total", "outcome" => "invalid_credentials")
                    .increment(1);
                warn!(username = %username, "Login failed: invalid credentials");
                return Err(AppError::unauthorized("Invalid credentials"));
            }
        };

        if !user.is_active {
            metrics::counter!("ryze_auth_logins_total", "outcome" => "inactive").increment(1);
            return Err(AppError::forbidden("Inactive user"));
        }

        let pair = self
            .tokens
            .issue_pair(&user.id, user.username.as_str(), user.roles())?;

        metrics::counter!("ryze_auth_logins_total", "outcome" => "success").increment(1);
        info!(user_id = %user.id, "User logged in");
        Ok(pair)
    }

    /// 使用刷新令牌换取新的令牌对
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<TokenPair> {
        let claims = self.tokens.validate_refresh_token(refresh_token)?;
        let user = self.active_user(&claims).await?;
        self.tokens
            .issue_pair(&user.id, user.username.as_str(), user.roles())
    }

    /// 校验访问令牌并加载当前用户
    pub async fn authenticate(&self, access_token: &str) -> AppResult<(Claims, User)> {
        let claims = self.tokens.validate_access_token(access_token)?;
        let user = self.active_user(&claims).await?;
        Ok((claims, user))
    }

    async fn active_user(&self, claims: &Claims) -> AppResult<User> {
        let user_id = claims.user_id()?;
        let user = self
            .users
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("User no longer exists"))?;

        if !user.is_active {
            return Err(AppError::forbidden("Inactive user"));
        }
        Ok(user)
    }
}
