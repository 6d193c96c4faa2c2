//! 消息生成 - 把进程状态变化事件转换为带时间戳的可读消息

use super::clock::{format_timestamp, Clock};
use super::policy::MonitorPolicy;
use crate::error::ParseError;
use crate::event::Event;

/// 进程意外退出监控
///
/// `expected` 非零的退出（例如主动重启）会被抑制。
#[derive(Debug, Clone, Copy, Default)]
pub struct CrashPolicy;

impl MonitorPolicy for CrashPolicy {
    fn name(&self) -> &str {
        "crash"
    }

    fn interesting_events(&self) -> &[&'static str] {
        &["PROCESS_STATE_EXITED"]
    }

    fn compose(&self, event: &Event, clock: &dyn Clock) -> Result<Option<String>, ParseError> {
        let fields = event.payload_fields()?;

        if fields.require_int("expected")? != 0 {
            return Ok(None);
        }

        let text = format!(
            "Process {}:{} (pid {}) died unexpectedly",
            fields.require("groupname")?,
            fields.require("processname")?,
            fields.require("pid")?,
        );
        Ok(Some(stamp(clock, &text)))
    }
}

/// 进程多次启动失败监控，不做抑制
#[derive(Debug, Clone, Copy, Default)]
pub struct FatalPolicy;

impl MonitorPolicy for FatalPolicy {
    fn name(&self) -> &str {
        "fatal"
    }

    fn interesting_events(&self) -> &[&'static str] {
        &["PROCESS_STATE_FATAL"]
    }

    fn compose(&self, event: &Event, clock: &dyn Clock) -> Result<Option<String>, ParseError> {
        let fields = event.payload_fields()?;

        let text = format!(
            "Process {}:{} failed to start too many times",
            fields.require("groupname")?,
            fields.require("processname")?,
        );
        Ok(Some(stamp(clock, &text)))
    }
}

fn stamp(clock: &dyn Clock, text: &str) -> String {
    format!("{} -- {}", format_timestamp(clock.now()), text)
}
