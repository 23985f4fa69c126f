//! 运维手册（命令笔记）：维护与按序执行

use std::sync::Arc;

use chrono::Utc;
use ryze_common::{ExecutionId, RunbookId, UserId};
use ryze_config::RunbookConfig;
use ryze_errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::entities::{Runbook, RunbookExecution, StepResult};
use crate::domain::repositories::RunbookRepository;
use crate::infrastructure::executor::{ExecutionOptions, RunbookExecutor};

const DEFAULT_HISTORY_LIMIT: i64 = 20;
const MAX_HISTORY_LIMIT: i64 = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRunbook {
    pub title: String,
    pub description: Option<String>,
    pub commands: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRunbook {
    pub title: Option<String>,
    pub description: Option<String>,
    pub commands: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOut {
    pub execution_id: ExecutionId,
    pub note_id: RunbookId,
    pub title: String,
    pub dry_run: bool,
    pub succeeded: bool,
    pub results: Vec<StepResult>,
}

pub struct RunbookService {
    runbooks: Arc<dyn RunbookRepository>,
    executor: RunbookExecutor,
    execution_enabled: bool,
    max_commands: usize,
}

impl RunbookService {
    pub fn new(
        runbooks: Arc<dyn RunbookRepository>,
        executor: RunbookExecutor,
        config: &RunbookConfig,
    ) -> Self {
        Self {
            runbooks,
            executor,
            execution_enabled: config.execution_enabled,
            max_commands: config.max_commands,
        }
    }

    pub async fn create(&self, owner: &UserId, input: CreateRunbook) -> AppResult<Runbook> {
        let runbook = Runbook::new(
            *owner,
            &input.title,
            input.description,
            input.commands,
            input.tags,
            self.max_commands,
        )?;
        self.runbooks.save(&runbook).await?;
        info!(runbook_id = %runbook.id, commands = runbook.commands.len(), "Command note created");
        Ok(runbook)
    }

    pub async fn list(&self, owner: &UserId, tag: Option<String>) -> AppResult<Vec<Runbook>> {
        let tag = tag
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty());
        self.runbooks.list_by_owner(owner, tag).await
    }

    /// 非所有者与不存在一样返回 404
    pub async fn get(&self, id: &RunbookId, owner: &UserId) -> AppResult<Runbook> {
        self.runbooks
            .find_by_id(id)
            .await?
            .filter(|r| r.is_owned_by(owner))
            .ok_or_else(|| AppError::not_found("Command note not found or access denied"))
    }

    pub async fn update(
        &self,
        id: &RunbookId,
        owner: &UserId,
        input: UpdateRunbook,
    ) -> AppResult<Runbook> {
        let mut runbook = self.get(id, owner).await?;

        if let Some(title) = input.title {
            runbook.rename(&title)?;
        }
        if input.description.is_some() {
            runbook.description = input.description;
        }
        if let Some(commands) = input.commands {
            runbook.replace_commands(commands, self.max_commands)?;
        }
        if let Some(tags) = input.tags {
            runbook.replace_tags(tags);
        }
        runbook.touch();

        self.runbooks.update(&runbook).await?;
        Ok(runbook)
    }

    pub async fn delete(&self, id: &RunbookId, owner: &UserId) -> AppResult<()> {
        let runbook = self.get(id, owner).await?;
        self.runbooks.delete(&runbook.id).await?;
        info!(runbook_id = %id, "Command note deleted");
        Ok(())
    }

    /// 按顺序执行；真实执行需要在配置中开启
    pub async fn execute(
        &self,
        id: &RunbookId,
        user_id: &UserId,
        options: ExecutionOptions,
    ) -> AppResult<ExecutionOut> {
        let runbook = self.get(id, user_id).await?;
        if !options.dry_run && !self.execution_enabled {
            return Err(AppError::failed_precondition(
                "Command execution is disabled on this server",
            ));
        }

        let mode = if options.dry_run { "dry_run" } else { "real" };
        metrics::counter!("ryze_runbook_executions_total", "mode" => mode).increment(1);
        info!(runbook_id = %id, user_id = %user_id, mode, "Executing command note");

        let started_at = Utc::now();
        let results = self.executor.run(&runbook.commands, options).await;
        for result in &results {
            let outcome = if result.success { "success" } else { "failure" };
            metrics::counter!("ryze_runbook_commands_total", "outcome" => outcome).increment(1);
        }
        let succeeded = results.iter().all(|r| r.success);

        let execution = RunbookExecution {
            id: ExecutionId::new(),
            runbook_id: runbook.id,
            user_id: *user_id,
            dry_run: options.dry_run,
            started_at,
            finished_at: Utc::now(),
            succeeded,
            results,
        };
        self.runbooks.save_execution(&execution).await?;

        Ok(ExecutionOut {
            execution_id: execution.id,
            note_id: runbook.id,
            title: runbook.title,
            dry_run: execution.dry_run,
            succeeded,
            results: execution.results,
        })
    }

    pub async fn executions(
        &self,
        id: &RunbookId,
        owner: &UserId,
        limit: Option<i64>,
    ) -> AppResult<Vec<RunbookExecution>> {
        let runbook = self.get(id, owner).await?;
        let limit = limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT);
        self.runbooks.list_executions(&runbook.id, limit).await
    }
}
