//! 运维手册步骤解析

use std::path::{Path, PathBuf};

/// 单个步骤
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunbookStep {
    /// `cd <dir>`：只影响本次执行后续步骤的工作目录
    ChangeDirectory(Option<String>),
    /// 交给 shell 执行的命令
    Shell(String),
}

impl RunbookStep {
    /// 仅当整条命令是 `cd <dir>` 时视为目录切换，`cd a && make` 之类仍交给 shell
    pub fn parse(command: &str) -> Self {
        let command = command.trim();
        let mut parts = command.splitn(2, char::is_whitespace);
        if parts.next() == Some("cd") {
            let target = parts.next().map(str::trim).filter(|t| !t.is_empty());
            match target {
                Some(t) if is_plain_directory(t) => {
                    return Self::ChangeDirectory(Some(unquote(t).to_string()));
                }
                None => return Self::ChangeDirectory(None),
                Some(_) => {}
            }
        }
        Self::Shell(command.to_string())
    }
}

fn is_plain_directory(target: &str) -> bool {
    !target.contains(|c| matches!(c, ';' | '&' | '|' | '>' | '<' | '`' | '$' | '\n'))
}

fn unquote(target: &str) -> &str {
    let bytes = target.as_bytes();
    if bytes.len() >= 2
        && ((bytes[0] == b'"' && bytes[bytes.len() - 1] == b'"')
            || (bytes[0] == b'\'' && bytes[bytes.len() - 1] == b'\''))
    {
        &target[1..target.len() - 1]
    } else {
        target
    }
}

/// 相对路径基于当前工作目录解析
pub fn resolve_directory(current: &Path, target: &str) -> PathBuf {
    let target = Path::new(target);
    if target.is_absolute() {
        target.to_path_buf()
    } else {
        current.join(target)
    }
}
