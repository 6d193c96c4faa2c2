//! 进程状态监控 - 策略、消息生成、批处理状态机与事件循环

pub mod batch;
pub mod clock;
pub mod composer;
pub mod listener;
pub mod policy;

pub use batch::{BatchMonitor, BatchWindow, Outcome};
pub use clock::{format_timestamp, Clock, FixedClock, SystemClock, TIMESTAMP_FORMAT};
pub use composer::{CrashPolicy, FatalPolicy};
pub use listener::{Listener, RunSummary};
pub use policy::{MonitorKind, MonitorPolicy};
