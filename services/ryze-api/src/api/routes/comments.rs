//! 评论与投票

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use ryze_common::{CommentId, RequestId};
use ryze_errors::AppResult;
use serde::Deserialize;

use crate::api::auth::{AuthUser, MaybeAuthUser};
use crate::api::state::AppState;
use crate::application::comment_service::{CommentOut, CreateComment, VoteOut};
use crate::application::dto::MessageOut;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/requests/{id}/comments", get(list).post(create))
        .route("/comments/{id}/vote", post(vote))
        .route("/comments/{id}", delete(remove))
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub vote_type: i16,
}

async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(request_id): Path<RequestId>,
    Json(input): Json<CreateComment>,
) -> AppResult<(StatusCode, Json<CommentOut>)> {
    let comment = state
        .comments
        .create(&request_id, &auth.user.id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn list(
    State(state): State<AppState>,
    MaybeAuthUser(auth): MaybeAuthUser,
    Path(request_id): Path<RequestId>,
) -> AppResult<Json<Vec<CommentOut>>> {
    let viewer = auth.as_ref().map(|a| &a.user.id);
    Ok(Json(state.comments.list(&request_id, viewer).await?))
}

async fn vote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<CommentId>,
    Json(req): Json<VoteRequest>,
) -> AppResult<Json<VoteOut>> {
    Ok(Json(
        state.comments.vote(&id, &auth.user.id, req.vote_type).await?,
    ))
}

async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<CommentId>,
) -> AppResult<Json<MessageOut>> {
    state.comments.delete(&id, &auth.user.id).await?;
    Ok(Json(MessageOut::new("Comment deleted successfully")))
}
