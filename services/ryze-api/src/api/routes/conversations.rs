//! 开发者与客户的会话

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use ryze_common::ConversationId;
use ryze_errors::AppResult;

use crate::api::auth::AuthUser;
use crate::api::state::AppState;
use crate::application::conversation_service::{
    ConversationMessageOut, ConversationOut, PostMessage, StartConversation,
    UpdateConversationStatus,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/conversations", post(start))
        .route("/conversations/user/list", get(list))
        .route("/conversations/{id}", get(detail).patch(update_status))
        .route("/conversations/{id}/messages", post(post_message))
}

async fn start(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<StartConversation>,
) -> AppResult<(StatusCode, Json<ConversationOut>)> {
    let conversation = state.conversations.start(&auth.user, input).await?;
    Ok((StatusCode::CREATED, Json(conversation)))
}

async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<ConversationOut>>> {
    Ok(Json(state.conversations.list_for_user(&auth.user.id).await?))
}

async fn detail(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<ConversationId>,
) -> AppResult<Json<ConversationOut>> {
    Ok(Json(state.conversations.get(&id, &auth.user.id).await?))
}

async fn post_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<ConversationId>,
    Json(input): Json<PostMessage>,
) -> AppResult<(StatusCode, Json<ConversationMessageOut>)> {
    let message = state
        .conversations
        .post_message(&id, &auth.user, input)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<ConversationId>,
    Json(input): Json<UpdateConversationStatus>,
) -> AppResult<Json<ConversationOut>> {
    let conversation = state
        .conversations
        .update_status(&id, &auth.user.id, input)
        .await?;
    Ok(Json(conversation))
}
