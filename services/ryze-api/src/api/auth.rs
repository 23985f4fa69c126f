//! 认证中间件与提取器
//!
//! `authenticate` 在所有路由上运行：携带有效 Bearer 令牌时注入 [`AuthUser`]，
//! 令牌无效时记录失败原因，由 [`AuthUser`] 在需要认证的处理器中返回

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use ryze_auth_core::Claims;
use ryze_errors::AppError;
use tracing::debug;

use super::state::AppState;
use crate::domain::entities::User;

/// 已认证的调用者
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub claims: Claims,
    pub user: User,
}

/// 可选认证：无令牌或令牌无效时为 `None`
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

#[derive(Debug, Clone)]
struct AuthRejection(AppError);

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// JWT 认证中间件
pub async fn authenticate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    if let Some(token) = bearer_token(&request) {
        match state.accounts.authenticate(token).await {
            Ok((claims, user)) => {
                debug!(user_id = %user.id, "Token validated");
                request.extensions_mut().insert(AuthUser { claims, user });
            }
            Err(e) => {
                debug!(error = %e, "Token rejected");
                request.extensions_mut().insert(AuthRejection(e));
            }
        }
    }
    next.run(request).await
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(auth) = parts.extensions.get::<AuthUser>() {
            return Ok(auth.clone());
        }
        match parts.extensions.get::<AuthRejection>() {
            Some(AuthRejection(e)) => Err(e.clone()),
            None => Err(AppError::unauthenticated("Not authenticated")),
        }
    }
}

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<AuthUser>().cloned()))
    }
}
