//! Process State Monitor CLI
//!
//! 作为 supervisor 事件监听器运行，批量发送进程异常通知

use anyhow::Result;
use clap::{Parser, Subcommand};
use process_state_monitor::cli::{handle_batch, BatchArgs};
use process_state_monitor::MonitorKind;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "psmon")]
#[command(about = "Process State Monitor - supervisor 事件监听器，批量发送进程异常邮件")]
#[command(version)]
struct Cli {
    /// 输出 debug 日志
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 进程意外退出（PROCESS_STATE_EXITED）时批量发送邮件
    CrashMailBatch(BatchArgs),
    /// 进程多次启动失败（PROCESS_STATE_FATAL）时批量发送邮件
    FatalMailBatch(BatchArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 日志写 stderr，stdout 只留给 supervisor 协议
    // 通过 RUST_LOG 环境变量控制日志级别，例如: RUST_LOG=debug psmon crash-mail-batch ...
    let default_level = if cli.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "process_state_monitor={0},psmon={0}",
            default_level
        ))
    });

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let (kind, args) = match cli.command {
        Commands::CrashMailBatch(args) => (MonitorKind::Crash, args),
        Commands::FatalMailBatch(args) => (MonitorKind::Fatal, args),
    };

    match handle_batch(kind, args) {
        Ok(summary) => {
            info!(
                events = summary.events,
                notifications = summary.notifications_sent,
                dropped = summary.dropped,
                "Listener exited"
            );
            Ok(())
        }
        Err(e) => {
            error!(monitor = %kind, error = %format!("{:#}", e), "Listener terminated");
            Err(e)
        }
    }
}
