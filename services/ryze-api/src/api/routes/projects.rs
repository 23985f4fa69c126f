//! 项目

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use ryze_common::ProjectId;
use ryze_errors::AppResult;

use crate::api::auth::AuthUser;
use crate::api::state::AppState;
use crate::application::dto::MessageOut;
use crate::application::project_service::{
    CreateProject, ProjectDetail, ProjectSummary, UpdateProject,
};
use crate::domain::entities::Project;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/projects", get(list).post(create))
        .route("/projects/{id}", get(detail).put(update).delete(remove))
}

async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<Project>)> {
    let project = state.projects.create(&auth.user, input).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<ProjectSummary>>> {
    Ok(Json(state.projects.list(&auth.user.id).await?))
}

async fn detail(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<ProjectId>,
) -> AppResult<Json<ProjectDetail>> {
    Ok(Json(state.projects.get(&id, &auth.user.id).await?))
}

async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<ProjectId>,
    Json(input): Json<UpdateProject>,
) -> AppResult<Json<Project>> {
    Ok(Json(state.projects.update(&id, &auth.user.id, input).await?))
}

async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<ProjectId>,
) -> AppResult<Json<MessageOut>> {
    state.projects.delete(&id, &auth.user.id).await?;
    Ok(Json(MessageOut::new("Project deleted successfully")))
}
