//! 运维手册（命令笔记）
//!
//! 一份运维手册是有序的 shell 命令列表，可按顺序回放或 dry run

use chrono::{DateTime, Utc};
use ryze_common::{ExecutionId, RunbookId, UserId};
use ryze_errors::AppError;
use serde::{Deserialize, Serialize};

/// 运维手册规则错误
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RunbookError {
    #[error("Title cannot be empty")]
    EmptyTitle,

    #[error("Title must be at most {max} characters")]
    TitleTooLong { max: usize },

    #[error("A command note needs at least one command")]
    NoCommands,

    #[error("Commands cannot contain NUL characters")]
    NulInCommand,

    #[error("Too many commands: {actual} (maximum {max})")]
    TooManyCommands { actual: usize, max: usize },
}

impl From<RunbookError> for AppError {
    fn from(err: RunbookError) -> Self {
        AppError::validation(err.to_string())
    }
}

/// 与 runbooks.title 列宽一致
const MAX_TITLE_LEN: usize = 255;

/// 去除首尾空白并丢弃空行
pub fn normalize_commands(
    commands: Vec<String>,
    max_commands: usize,
) -> Result<Vec<String>, RunbookError> {
    let commands: Vec<String> = commands
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();

    if commands.is_empty() {
        return Err(RunbookError::NoCommands);
    }
    if commands.iter().any(|c| c.contains('\0')) {
        return Err(RunbookError::NulInCommand);
    }
    if commands.len() > max_commands {
        return Err(RunbookError::TooManyCommands {
            actual: commands.len(),
            max: max_commands,
        });
    }
    Ok(commands)
}

/// 小写、去重，保持首次出现的顺序
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !normalized.contains(&tag) {
            normalized.push(tag);
        }
    }
    normalized
}

fn normalize_title(title: &str) -> Result<String, RunbookError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(RunbookError::EmptyTitle);
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(RunbookError::TitleTooLong { max: MAX_TITLE_LEN });
    }
    Ok(title.to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Runbook {
    pub id: RunbookId,
    pub user_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub commands: Vec<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Runbook {
    pub fn new(
        owner: UserId,
        title: &str,
        description: Option<String>,
        commands: Vec<String>,
        tags: Vec<String>,
        max_commands: usize,
    ) -> Result<Self, RunbookError> {
        Ok(Self {
            id: RunbookId::new(),
            user_id: owner,
            title: normalize_title(title)?,
            description,
            commands: normalize_commands(commands, max_commands)?,
            tags: normalize_tags(tags),
            created_at: Utc::now(),
            updated_at: None,
        })
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.user_id == *user_id
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = tag.trim().to_lowercase();
        self.tags.iter().any(|t| *t == tag)
    }

    pub fn rename(&mut self, title: &str) -> Result<(), RunbookError> {
        self.title = normalize_title(title)?;
        Ok(())
    }

    pub fn replace_commands(
        &mut self,
        commands: Vec<String>,
        max_commands: usize,
    ) -> Result<(), RunbookError> {
        self.commands = normalize_commands(commands, max_commands)?;
        Ok(())
    }

    pub fn replace_tags(&mut self, tags: Vec<String>) {
        self.tags = normalize_tags(tags);
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

/// 单个命令的执行结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub command: String,
    pub success: bool,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    pub executed_at: DateTime<Utc>,
}

/// 一次执行记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunbookExecution {
    pub id: ExecutionId,
    pub runbook_id: RunbookId,
    pub user_id: UserId,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub succeeded: bool,
    pub results: Vec<StepResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_are_trimmed_and_blank_lines_dropped() {
        let commands = normalize_commands(
            vec!["  cd /srv/app ".into(), "".into(), "   ".into(), "git pull".into()],
            50,
        )
        .unwrap();
        assert_eq!(commands, vec!["cd /srv/app", "git pull"]);
    }

    #[test]
    fn test_command_count_limits() {
        assert_eq!(
            normalize_commands(vec!["  ".into()], 50),
            Err(RunbookError::NoCommands)
        );
        assert_eq!(
            normalize_commands(vec!["a".into(), "b".into(), "c".into()], 2),
            Err(RunbookError::TooManyCommands { actual: 3, max: 2 })
        );
        assert_eq!(
            normalize_commands(vec!["echo a\0b".into()], 50),
            Err(RunbookError::NulInCommand)
        );
    }

    #[test]
    fn test_tags_are_lowercased_and_deduplicated() {
        let tags = normalize_tags(vec![
            "Deploy".into(),
            " deploy ".into(),
            "Frontend".into(),
            "".into(),
        ]);
        assert_eq!(tags, vec!["deploy", "frontend"]);
    }

    #[test]
    fn test_new_runbook_validation() {
        let owner = UserId::new();
        assert_eq!(
            Runbook::new(owner, "  ", None, vec!["ls".into()], vec![], 50).unwrap_err(),
            RunbookError::EmptyTitle
        );
        assert_eq!(
            Runbook::new(owner, &"t".repeat(256), None, vec!["ls".into()], vec![], 50).unwrap_err(),
            RunbookError::TitleTooLong { max: 255 }
        );

        let runbook = Runbook::new(
            owner,
            "Restart backend",
            None,
            vec!["sudo systemctl restart ryze".into()],
            vec!["Ops".into()],
            50,
        )
        .unwrap();
        assert!(runbook.is_owned_by(&owner));
        assert!(runbook.has_tag("OPS"));
        assert!(!runbook.has_tag("frontend"));
    }
}
