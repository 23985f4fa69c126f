//! 开发者抢单

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
};
use ryze_auth_core::{ROLE_DEVELOPER, require_role};
use ryze_common::RequestId;
use ryze_errors::AppResult;

use crate::api::auth::AuthUser;
use crate::api::state::AppState;
use crate::application::dto::MessageOut;
use crate::application::snag_service::{SnagCommand, SnagListItem, SnagOut};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/snagged-requests", get(list).post(snag))
        .route("/snagged-requests/{request_id}", delete(remove))
}

async fn snag(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(cmd): Json<SnagCommand>,
) -> AppResult<(StatusCode, Json<SnagOut>)> {
    require_role!(auth.claims, ROLE_DEVELOPER, "Only developers can snag requests");
    let snag = state.snags.snag(&auth.user, cmd).await?;
    Ok((StatusCode::CREATED, Json(snag)))
}

async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<SnagListItem>>> {
    require_role!(auth.claims, ROLE_DEVELOPER, "Only developers have snagged requests");
    Ok(Json(state.snags.list(&auth.user.id).await?))
}

async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(request_id): Path<RequestId>,
) -> AppResult<Json<MessageOut>> {
    state.snags.remove(&request_id, &auth.user.id).await?;
    Ok(Json(MessageOut::new("Request removed from snagged list")))
}
