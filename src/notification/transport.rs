//! 邮件投递 trait 与实现
//!
//! 投递是同步阻塞调用，没有超时：sendmail 卡住会阻塞整个事件循环。

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::{debug, error, info};

use super::mail::Notification;
use crate::error::TransportError;

/// 投递结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendResult {
    /// 已交给邮件系统
    Sent,
    /// 跳过（例如 dry-run）
    Skipped(String),
}

/// 邮件投递 trait
pub trait MailTransport: Send + Sync {
    /// 名称（用于日志）
    fn name(&self) -> &str;

    /// 同步投递一封通知
    fn deliver(&self, notification: &Notification) -> Result<SendResult, TransportError>;
}

/// 通过本地 sendmail 命令投递
#[derive(Debug, Clone)]
pub struct SendmailTransport {
    program: PathBuf,
    args: Vec<String>,
}

impl SendmailTransport {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// 解析命令行（如 `/usr/sbin/sendmail -t -i`），并在 PATH 中定位可执行文件
    pub fn from_command_line(command_line: &str) -> Result<Self, TransportError> {
        let mut parts = command_line.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| TransportError::CommandNotFound(command_line.to_string()))?;
        let resolved = which::which(program)
            .map_err(|_| TransportError::CommandNotFound(program.to_string()))?;

        Ok(Self::new(resolved, parts.map(str::to_string).collect()))
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }
}

impl MailTransport for SendmailTransport {
    fn name(&self) -> &str {
        "sendmail"
    }

    fn deliver(&self, notification: &Notification) -> Result<SendResult, TransportError> {
        let command = self.program.display().to_string();
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| TransportError::Spawn {
                command: command.clone(),
                source,
            })?;

        // 写入失败（例如子进程提前退出）也要等待子进程，避免留下僵尸进程
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(notification.to_rfc822().as_bytes()),
            None => Ok(()),
        };

        let output = child.wait_with_output()?;
        if output.status.success() {
            written?;
            info!(
                to = %notification.to,
                subject = %notification.subject,
                lines = notification.body.lines().count(),
                "Notification mailed"
            );
            Ok(SendResult::Sent)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!(command = %command, error = %stderr, "sendmail failed");
            Err(TransportError::CommandFailed {
                status: output.status.to_string(),
                stderr,
            })
        }
    }
}

/// Dry-run：只记录日志，不发送
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunTransport;

impl MailTransport for DryRunTransport {
    fn name(&self) -> &str {
        "dry-run"
    }

    fn deliver(&self, notification: &Notification) -> Result<SendResult, TransportError> {
        match serde_json::to_string(notification) {
            Ok(json) => info!(notification = %json, "[DRY-RUN] Would send notification"),
            Err(e) => debug!(error = %e, "[DRY-RUN] Could not serialize notification"),
        }
        Ok(SendResult::Skipped("dry-run".to_string()))
    }
}
