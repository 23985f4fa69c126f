//! 开发者评分

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use ryze_common::UserId;
use ryze_errors::AppResult;

use crate::api::auth::AuthUser;
use crate::api::state::AppState;
use crate::application::rating_service::{RateDeveloper, RateOut};
use crate::domain::entities::{DeveloperRating, RatingSummary};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ratings/developer/{user_id}", post(rate))
        .route("/ratings/developer/{user_id}/rating", get(summary))
        .route("/ratings/developer/{user_id}/user-rating", get(user_rating))
}

async fn rate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(developer_id): Path<UserId>,
    Json(input): Json<RateDeveloper>,
) -> AppResult<Json<RateOut>> {
    Ok(Json(
        state
            .ratings
            .rate(&developer_id, &auth.user.id, input)
            .await?,
    ))
}

async fn summary(
    State(state): State<AppState>,
    Path(developer_id): Path<UserId>,
) -> AppResult<Json<RatingSummary>> {
    Ok(Json(state.ratings.summary(&developer_id).await?))
}

async fn user_rating(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(developer_id): Path<UserId>,
) -> AppResult<Json<Option<DeveloperRating>>> {
    Ok(Json(
        state
            .ratings
            .user_rating(&developer_id, &auth.user.id)
            .await?,
    ))
}
