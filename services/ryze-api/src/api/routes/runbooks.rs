//! 运维手册（命令笔记）

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use ryze_common::RunbookId;
use ryze_errors::AppResult;
use serde::Deserialize;

use crate::api::auth::AuthUser;
use crate::api::state::AppState;
use crate::application::dto::MessageOut;
use crate::application::runbook_service::{CreateRunbook, ExecutionOut, UpdateRunbook};
use crate::domain::entities::{Runbook, RunbookExecution};
use crate::infrastructure::executor::ExecutionOptions;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/command_notes", get(list).post(create))
        .route("/command_notes/{id}", get(detail).put(update).delete(remove))
        .route("/command_notes/{id}/execute", post(execute))
        .route("/command_notes/{id}/executions", get(executions))
}

#[derive(Debug, Deserialize)]
pub struct TagQuery {
    pub tag: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExecuteQuery {
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub continue_on_failure: bool,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateRunbook>,
) -> AppResult<(StatusCode, Json<Runbook>)> {
    let runbook = state.runbooks.create(&auth.user.id, input).await?;
    Ok((StatusCode::CREATED, Json(runbook)))
}

async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<TagQuery>,
) -> AppResult<Json<Vec<Runbook>>> {
    let tag = query.tag.filter(|t| !t.trim().is_empty());
    Ok(Json(state.runbooks.list(&auth.user.id, tag).await?))
}

async fn detail(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<RunbookId>,
) -> AppResult<Json<Runbook>> {
    Ok(Json(state.runbooks.get(&id, &auth.user.id).await?))
}

async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<RunbookId>,
    Json(input): Json<UpdateRunbook>,
) -> AppResult<Json<Runbook>> {
    Ok(Json(state.runbooks.update(&id, &auth.user.id, input).await?))
}

async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<RunbookId>,
) -> AppResult<Json<MessageOut>> {
    state.runbooks.delete(&id, &auth.user.id).await?;
    Ok(Json(MessageOut::new("Command note deleted successfully")))
}

async fn execute(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<RunbookId>,
    Query(query): Query<ExecuteQuery>,
) -> AppResult<Json<ExecutionOut>> {
    let options = ExecutionOptions {
        dry_run: query.dry_run,
        continue_on_failure: query.continue_on_failure,
    };
    Ok(Json(state.runbooks.execute(&id, &auth.user.id, options).await?))
}

async fn executions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<RunbookId>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<RunbookExecution>>> {
    Ok(Json(
        state
            .runbooks
            .executions(&id, &auth.user.id, query.limit)
            .await?,
    ))
}
