//! 运维手册 Repository trait

use async_trait::async_trait;
use ryze_common::{RunbookId, UserId};
use ryze_errors::AppResult;

use crate::domain::entities::{Runbook, RunbookExecution};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RunbookRepository: Send + Sync {
    async fn find_by_id(&self, id: &RunbookId) -> AppResult<Option<Runbook>>;

    /// 用户的运维手册，可按标签过滤（按创建时间倒序）
    async fn list_by_owner(&self, owner: &UserId, tag: Option<String>) -> AppResult<Vec<Runbook>>;

    async fn save(&self, runbook: &Runbook) -> AppResult<()>;

    async fn update(&self, runbook: &Runbook) -> AppResult<()>;

    async fn delete(&self, id: &RunbookId) -> AppResult<()>;

    async fn save_execution(&self, execution: &RunbookExecution) -> AppResult<()>;

    /// 执行历史（按开始时间倒序）
    async fn list_executions(
        &self,
        runbook_id: &RunbookId,
        limit: i64,
    ) -> AppResult<Vec<RunbookExecution>>;
}
