//! 开发者与客户资料

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
};
use ryze_common::{Pagination, UserId};
use ryze_errors::AppResult;
use serde::Deserialize;

use crate::api::auth::AuthUser;
use crate::api::state::AppState;
use crate::application::dto::UserOut;
use crate::application::profile_service::{
    ClientProfileFields, CreateDeveloperProfile, ProfileStatus, PublicDeveloperOut,
    UpdateDeveloperProfile,
};
use crate::domain::entities::{ClientProfile, DeveloperProfile};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/profile/me", get(me))
        .route(
            "/profile/developer",
            get(get_developer)
                .post(create_developer)
                .put(update_developer),
        )
        .route("/profile/developer/visibility", patch(set_visibility))
        .route(
            "/profile/client",
            get(get_client).post(create_client).put(update_client),
        )
        .route("/profile/check-profile", get(check_profile))
        .route("/profile/developers/public", get(public_developers))
        .route("/profile/developers/{user_id}/public", get(public_developer))
}

#[derive(Debug, Deserialize)]
pub struct VisibilityRequest {
    pub is_public: bool,
}

async fn me(auth: AuthUser) -> Json<UserOut> {
    Json(UserOut::from(&auth.user))
}

async fn get_developer(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DeveloperProfile>> {
    Ok(Json(state.profiles.developer_profile(&auth.user).await?))
}

async fn create_developer(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateDeveloperProfile>,
) -> AppResult<(StatusCode, Json<DeveloperProfile>)> {
    let profile = state
        .profiles
        .create_developer_profile(&auth.user, input)
        .await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

async fn update_developer(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<UpdateDeveloperProfile>,
) -> AppResult<Json<DeveloperProfile>> {
    let profile = state
        .profiles
        .update_developer_profile(&auth.user, input)
        .await?;
    Ok(Json(profile))
}

async fn set_visibility(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<VisibilityRequest>,
) -> AppResult<Json<DeveloperProfile>> {
    let profile = state
        .profiles
        .set_developer_visibility(&auth.user, req.is_public)
        .await?;
    Ok(Json(profile))
}

async fn get_client(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<ClientProfile>> {
    Ok(Json(state.profiles.client_profile(&auth.user).await?))
}

async fn create_client(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<ClientProfileFields>,
) -> AppResult<(StatusCode, Json<ClientProfile>)> {
    let profile = state
        .profiles
        .create_client_profile(&auth.user, input)
        .await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

async fn update_client(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<ClientProfileFields>,
) -> AppResult<Json<ClientProfile>> {
    let profile = state
        .profiles
        .update_client_profile(&auth.user, input)
        .await?;
    Ok(Json(profile))
}

async fn check_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<ProfileStatus>> {
    Ok(Json(state.profiles.check_profile(&auth.user).await?))
}

async fn public_developers(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> AppResult<Json<Vec<PublicDeveloperOut>>> {
    Ok(Json(state.profiles.public_developers(page).await?))
}

async fn public_developer(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<PublicDeveloperOut>> {
    Ok(Json(state.profiles.public_developer(&user_id).await?))
}
