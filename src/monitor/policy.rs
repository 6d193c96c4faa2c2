//! 监控策略 - 决定关心哪些状态变化事件、如何生成消息
//!
//! 所有监控共享同一个批处理引擎，只替换策略对象。

use std::fmt;

use super::clock::Clock;
use super::composer::{CrashPolicy, FatalPolicy};
use crate::error::ParseError;
use crate::event::Event;

/// 监控策略 trait
pub trait MonitorPolicy: Send + Sync {
    /// 策略名称（用于日志）
    fn name(&self) -> &str;

    /// 关心的状态变化事件名
    fn interesting_events(&self) -> &[&'static str];

    /// 生成消息；返回 `None` 表示该事件被抑制
    fn compose(&self, event: &Event, clock: &dyn Clock) -> Result<Option<String>, ParseError>;
}

/// 内置的监控类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorKind {
    /// 进程意外退出（PROCESS_STATE_EXITED）
    Crash,
    /// 进程多次启动失败（PROCESS_STATE_FATAL）
    Fatal,
}

impl MonitorKind {
    pub fn policy(self) -> Box<dyn MonitorPolicy> {
        match self {
            MonitorKind::Crash => Box::new(CrashPolicy),
            MonitorKind::Fatal => Box::new(FatalPolicy),
        }
    }
}

impl fmt::Display for MonitorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorKind::Crash => write!(f, "crash"),
            MonitorKind::Fatal => write!(f, "fatal"),
        }
    }
}
