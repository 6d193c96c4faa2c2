// src/cli/batch.rs
//! Mail batch 命令 - 作为 supervisor 事件监听器运行
//!
//! supervisor 配置示例：
//!
//! ```ini
//! [eventlistener:crashmailbatch]
//! command=psmon crash-mail-batch --to-email=you@bar.com --from-email=me@bar.com
//! events=PROCESS_STATE,TICK_60
//! ```

use std::io;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use crate::config::{self, MonitorConfig, DEFAULT_SENDMAIL, DEFAULT_SUBJECT};
use crate::monitor::{BatchMonitor, Listener, MonitorKind, RunSummary};
use crate::notification::{DryRunTransport, MailTransport, NotificationDispatcher, SendmailTransport};
use crate::protocol::EventChannel;

/// Mail batch 命令参数
#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    /// 批处理周期（分钟），同一周期内的事件合并成一封邮件
    #[arg(long, short, default_value_t = 1)]
    pub interval: u32,

    /// 收件人地址
    #[arg(long = "to-email", short = 't', alias = "toEmail")]
    pub to_email: Option<String>,

    /// 发件人地址
    #[arg(long = "from-email", short = 'f', alias = "fromEmail")]
    pub from_email: Option<String>,

    /// 邮件主题
    #[arg(long, short, default_value = DEFAULT_SUBJECT)]
    pub subject: String,

    /// sendmail 命令行
    #[arg(long, default_value = DEFAULT_SENDMAIL)]
    pub sendmail: String,

    /// Dry-run 模式（只记录日志不发送）
    #[arg(long)]
    pub dry_run: bool,
}

impl BatchArgs {
    /// 转换为配置（尚未校验）
    pub fn to_config(&self) -> MonitorConfig {
        MonitorConfig::new(
            self.to_email.clone().unwrap_or_default(),
            self.from_email.clone().unwrap_or_default(),
        )
        .with_interval(self.interval)
        .with_subject(self.subject.clone())
    }

    /// 构建投递层
    pub fn transport(&self) -> Result<Box<dyn MailTransport>> {
        if self.dry_run {
            return Ok(Box::new(DryRunTransport));
        }
        let sendmail = SendmailTransport::from_command_line(&self.sendmail)
            .with_context(|| format!("无法使用 sendmail 命令: {}", self.sendmail))?;
        info!(program = %sendmail.program().display(), "Resolved sendmail");
        Ok(Box::new(sendmail))
    }
}

/// 处理 mail batch 命令：校验启动条件，然后在 stdin/stdout 上运行事件循环
pub fn handle_batch(kind: MonitorKind, args: BatchArgs) -> Result<RunSummary> {
    // 1. 启动条件
    config::ensure_supervised()?;

    let config = args.to_config();
    config.validate().context("配置无效")?;
    let transport = args.transport()?;

    info!(
        monitor = %kind,
        config = %serde_json::to_string(&config)?,
        dry_run = args.dry_run,
        "Starting mail batch listener"
    );

    // 2. 组装
    let dispatcher = NotificationDispatcher::new(&config, transport);
    let monitor = BatchMonitor::new(
        kind.policy(),
        dispatcher,
        config.window_interval_ticks(),
        io::stderr(),
    )?;
    let channel = EventChannel::new(io::stdin().lock(), io::stdout().lock());

    // 3. 运行
    let summary = Listener::new(channel, monitor).run()?;
    Ok(summary)
}
