//! 匿名反馈

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use ryze_auth_core::{ROLE_ADMIN, require_role};
use ryze_errors::AppResult;

use crate::api::auth::AuthUser;
use crate::api::state::AppState;
use crate::application::feedback_service::SubmitFeedback;
use crate::domain::entities::Feedback;

pub fn routes() -> Router<AppState> {
    Router::new().route("/feedback", get(list).post(submit))
}

async fn submit(
    State(state): State<AppState>,
    Json(input): Json<SubmitFeedback>,
) -> AppResult<(StatusCode, Json<Feedback>)> {
    let feedback = state.feedback.submit(input).await?;
    Ok((StatusCode::CREATED, Json(feedback)))
}

async fn list(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<Vec<Feedback>>> {
    require_role!(auth.claims, ROLE_ADMIN, "Admin access required");
    Ok(Json(state.feedback.list().await?))
}
