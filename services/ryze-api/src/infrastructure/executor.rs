//! 运维手册执行器
//!
//! 按顺序执行命令。`cd <dir>` 只改变本次执行后续步骤的工作目录，
//! 服务进程自身的工作目录保持不变。

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use chrono::Utc;
use ryze_common::utils::truncate_utf8;
use ryze_config::RunbookConfig;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::domain::entities::StepResult;
use crate::domain::services::{RunbookStep, resolve_directory};

/// 执行选项
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionOptions {
    pub dry_run: bool,
    /// 失败后继续执行剩余步骤
    pub continue_on_failure: bool,
}

#[derive(Debug, Clone)]
pub struct RunbookExecutor {
    shell: String,
    timeout: Duration,
    max_output_bytes: usize,
    initial_dir: PathBuf,
}

impl RunbookExecutor {
    pub fn new(config: &RunbookConfig) -> Self {
        Self {
            shell: config.shell.clone(),
            timeout: Duration::from_secs(config.command_timeout_secs),
            max_output_bytes: config.max_output_bytes,
            initial_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// 指定初始工作目录
    pub fn with_initial_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.initial_dir = dir.into();
        self
    }

    /// 依次执行命令，未执行的步骤不出现在结果中
    pub async fn run(&self, commands: &[String], options: ExecutionOptions) -> Vec<StepResult> {
        let mut results = Vec::with_capacity(commands.len());
        let mut cwd = self.initial_dir.clone();

        for command in commands {
            let result = if options.dry_run {
                StepResult {
                    command: command.clone(),
                    success: true,
                    output: format!("[DRY RUN] Would execute: {}", command),
                    exit_code: None,
                    executed_at: Utc::now(),
                }
            } else {
                match RunbookStep::parse(command) {
                    RunbookStep::ChangeDirectory(target) => {
                        self.change_directory(command, target.as_deref(), &mut cwd)
                    }
                    RunbookStep::Shell(cmd) => self.spawn(&cmd, &cwd).await,
                }
            };

            let failed = !result.success;
            results.push(result);
            if failed && !options.continue_on_failure {
                debug!(command = %command, "Stopping runbook after failed step");
                break;
            }
        }
        results
    }

    fn change_directory(&self, command: &str, target: Option<&str>, cwd: &mut PathBuf) -> StepResult {
        let outcome = match target {
            None => Err("cd requires a directory argument".to_string()),
            Some(target) => {
                let next = resolve_directory(cwd, target);
                if next.is_dir() {
                    let output = format!("Changed directory to {}", next.display());
                    *cwd = next;
                    Ok(output)
                } else {
                    Err(format!("Directory not found: {}", next.display()))
                }
            }
        };

        let (success, output) = match outcome {
            Ok(output) => (true, output),
            Err(output) => (false, output),
        };
        StepResult {
            command: command.to_string(),
            success,
            output,
            exit_code: None,
            executed_at: Utc::now(),
        }
    }

    async fn spawn(&self, command: &str, cwd: &Path) -> StepResult {
        let executed_at = Utc::now();
        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c")
            .arg(command)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // 独立进程组，超时时连同其派生的进程一起结束
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(command = %command, error = %e, "Failed to spawn runbook command");
                return StepResult {
                    command: command.to_string(),
                    success: false,
                    output: format!("Failed to execute command: {}", e),
                    exit_code: None,
                    executed_at,
                };
            }
        };
        // shell 退出后 id() 返回 None，进程组号需在此记下
        let process_group = child.id();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let limit = self.max_output_bytes;

        let finished = tokio::time::timeout(self.timeout, async {
            tokio::join!(
                read_capped(stdout, limit),
                read_capped(stderr, limit),
                child.wait()
            )
        })
        .await;

        let (success, output, exit_code) = match finished {
            Ok((stdout, stderr, Ok(status))) => {
                let success = status.success();
                let stream = if success { stdout } else { stderr };
                (success, self.render_output(&stream), status.code())
            }
            Ok((_, _, Err(e))) => {
                warn!(command = %command, error = %e, "Failed to wait for runbook command");
                (false, format!("Failed to execute command: {}", e), None)
            }
            Err(_) => {
                warn!(command = %command, timeout_secs = self.timeout.as_secs(), "Runbook command timed out");
                kill_process_group(process_group);
                if let Err(e) = child.kill().await {
                    debug!(command = %command, error = %e, "Runbook shell already exited");
                }
                (false, "Command execution timed out".to_string(), None)
            }
        };

        StepResult {
            command: command.to_string(),
            success,
            output,
            exit_code,
            executed_at,
        }
    }

    /// NUL 无法存入 PostgreSQL 的 text/jsonb，替换为 U+FFFD
    fn render_output(&self, bytes: &[u8]) -> String {
        let text = String::from_utf8_lossy(bytes).replace('\0', "\u{FFFD}");
        truncate_utf8(&text, self.max_output_bytes).to_string()
    }
}

/// 最多保留 `limit` 字节，其余读出后丢弃，避免子进程因管道写满而阻塞
async fn read_capped<R>(reader: Option<R>, limit: usize) -> Vec<u8>
where
    R: AsyncRead + Unpin,
{
    let Some(mut reader) = reader else {
        return Vec::new();
    };

    let mut buf = Vec::new();
    if let Err(e) = (&mut reader).take(limit as u64).read_to_end(&mut buf).await {
        debug!(error = %e, "Failed to read runbook command output");
        return buf;
    }
    if let Err(e) = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await {
        debug!(error = %e, "Failed to drain runbook command output");
    }
    buf
}

#[cfg(unix)]
fn kill_process_group(process_group: Option<u32>) {
    let Some(pgid) = process_group.and_then(|id| libc::pid_t::try_from(id).ok()) else {
        return;
    };
    // SAFETY: killpg 只向进程组发送信号，不涉及内存访问
    let rc = unsafe { libc::killpg(pgid, libc::SIGKILL) };
    if rc != 0 {
        debug!(pgid, error = %std::io::Error::last_os_error(), "Failed to kill runbook process group");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_process_group: Option<u32>) {}
