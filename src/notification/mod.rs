//! 通知层 - 批次合并为邮件并交给投递层
//!
//! # 使用示例
//! ```ignore
//! use process_state_monitor::config::MonitorConfig;
//! use process_state_monitor::notification::{DryRunTransport, NotificationDispatcher};
//!
//! let config = MonitorConfig::new("you@bar.com", "me@bar.com");
//! let dispatcher = NotificationDispatcher::new(&config, Box::new(DryRunTransport));
//! dispatcher.dispatch_if_non_empty(&["msg1".to_string()])?;
//! ```

pub mod dispatcher;
pub mod mail;
pub mod transport;

pub use dispatcher::NotificationDispatcher;
pub use mail::Notification;
pub use transport::{DryRunTransport, MailTransport, SendResult, SendmailTransport};
