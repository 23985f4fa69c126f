//! 需求、共享与可见性

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use ryze_common::{Pagination, ProjectId, RequestId, UserId};
use ryze_errors::AppResult;
use serde::Deserialize;

use crate::api::auth::AuthUser;
use crate::api::state::AppState;
use crate::application::dto::{MessageOut, UserSummary};
use crate::application::request_service::{
    CreateRequest, RequestOut, ShareCommand, ShareOut, UpdateRequest,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/requests", get(list).post(create))
        .route("/requests/public", get(list_public))
        .route("/requests/shared-with-me", get(shared_with_me))
        .route("/requests/search/users", get(search_users))
        .route("/requests/{id}", get(detail).put(update).delete(remove))
        .route("/requests/{id}/share", post(share))
        .route("/requests/{id}/share/{user_id}", delete(unshare))
        .route("/requests/{id}/shares", get(list_shares))
        .route("/requests/{id}/privacy", put(set_privacy))
        .route(
            "/requests/{id}/project",
            put(attach_project).delete(detach_project),
        )
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub project_id: Option<ProjectId>,
    pub include_shared: Option<bool>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct PrivacyRequest {
    pub is_public: bool,
}

#[derive(Debug, Deserialize)]
pub struct ProjectAssignment {
    pub project_id: ProjectId,
}

async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateRequest>,
) -> AppResult<(StatusCode, Json<RequestOut>)> {
    let request = state.requests.create(&auth.user.id, input).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<RequestOut>>> {
    let defaults = Pagination::default();
    let page = Pagination::new(
        query.skip.unwrap_or(defaults.skip),
        query.limit.unwrap_or(defaults.limit),
    );
    let requests = state
        .requests
        .list(
            &auth.user.id,
            query.project_id,
            query.include_shared.unwrap_or(true),
            page,
        )
        .await?;
    Ok(Json(requests))
}

async fn list_public(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> AppResult<Json<Vec<RequestOut>>> {
    Ok(Json(state.requests.list_public(page).await?))
}

async fn shared_with_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<RequestOut>>> {
    Ok(Json(state.requests.shared_with_me(&auth.user.id).await?))
}

async fn search_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<UserSummary>>> {
    Ok(Json(state.requests.search_users(&query.q, &auth.user.id).await?))
}

async fn detail(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<RequestId>,
) -> AppResult<Json<RequestOut>> {
    Ok(Json(state.requests.get(&id, &auth.user.id).await?))
}

async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<RequestId>,
    Json(input): Json<UpdateRequest>,
) -> AppResult<Json<RequestOut>> {
    Ok(Json(state.requests.update(&id, &auth.user.id, input).await?))
}

async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<RequestId>,
) -> AppResult<Json<MessageOut>> {
    state.requests.delete(&id, &auth.user.id).await?;
    Ok(Json(MessageOut::new("Request deleted successfully")))
}

async fn share(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<RequestId>,
    Json(cmd): Json<ShareCommand>,
) -> AppResult<(StatusCode, Json<ShareOut>)> {
    let share = state.requests.share(&id, &auth.user.id, cmd).await?;
    Ok((StatusCode::CREATED, Json(share)))
}

async fn unshare(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, user_id)): Path<(RequestId, UserId)>,
) -> AppResult<Json<MessageOut>> {
    state.requests.unshare(&id, &auth.user.id, &user_id).await?;
    Ok(Json(MessageOut::new("Share removed successfully")))
}

async fn list_shares(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<RequestId>,
) -> AppResult<Json<Vec<ShareOut>>> {
    Ok(Json(state.requests.list_shares(&id, &auth.user.id).await?))
}

async fn set_privacy(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<RequestId>,
    Json(req): Json<PrivacyRequest>,
) -> AppResult<Json<RequestOut>> {
    let request = state
        .requests
        .set_privacy(&id, &auth.user.id, req.is_public)
        .await?;
    Ok(Json(request))
}

async fn attach_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<RequestId>,
    Json(req): Json<ProjectAssignment>,
) -> AppResult<Json<RequestOut>> {
    let request = state
        .requests
        .attach_project(&id, &auth.user.id, req.project_id)
        .await?;
    Ok(Json(request))
}

async fn detach_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<RequestId>,
) -> AppResult<Json<RequestOut>> {
    Ok(Json(state.requests.detach_project(&id, &auth.user.id).await?))
}
