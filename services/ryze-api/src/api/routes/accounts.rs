//! 注册、登录与令牌

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use ryze_auth_core::TokenPair;
use ryze_common::UserId;
use ryze_errors::AppResult;
use serde::{Deserialize, Serialize};

use crate::api::auth::AuthUser;
use crate::api::state::AppState;
use crate::application::account_service::RegisterCommand;
use crate::application::dto::UserOut;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/me", get(me))
        .route("/auth/validate-token", get(validate_token))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct TokenValidation {
    pub id: UserId,
    pub username: String,
    pub is_active: bool,
}

async fn register(
    State(state): State<AppState>,
    Json(cmd): Json<RegisterCommand>,
) -> AppResult<(StatusCode, Json<UserOut>)> {
    let user = state.accounts.register(cmd).await?;
    Ok((StatusCode::CREATED, Json(UserOut::from(&user))))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<TokenPair>> {
    let pair = state.accounts.login(&req.username, &req.password).await?;
    Ok(Json(pair))
}

async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> AppResult<Json<TokenPair>> {
    let pair = state.accounts.refresh(&req.refresh_token).await?;
    Ok(Json(pair))
}

async fn me(auth: AuthUser) -> Json<UserOut> {
    Json(UserOut::from(&auth.user))
}

async fn validate_token(auth: AuthUser) -> Json<TokenValidation> {
    Json(TokenValidation {
        id: auth.user.id,
        username: auth.user.username.as_str().to_string(),
        is_active: auth.user.is_active,
    })
}
