//! Process State Monitor - supervisor 事件监听器，批量发送进程崩溃通知

pub mod cli;
pub mod config;
pub mod error;
pub mod event;
pub mod monitor;
pub mod notification;
pub mod protocol;

pub use config::{ensure_supervised, MonitorConfig};
pub use error::{ConfigError, FramingError, MonitorError, ParseError, TransportError};
pub use event::{Classifier, Event, EventCategory};
pub use monitor::{BatchMonitor, BatchWindow, Listener, MonitorKind, MonitorPolicy, RunSummary};
pub use notification::{MailTransport, Notification, NotificationDispatcher, SendResult};
pub use protocol::{EventChannel, Fields, RawEvent};
