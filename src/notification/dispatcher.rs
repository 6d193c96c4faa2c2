//! 通知分发器 - 把一个批次的消息合并成一封邮件交给投递层

use super::mail::Notification;
use super::transport::{MailTransport, SendResult};
use crate::config::MonitorConfig;
use crate::error::TransportError;
use tracing::{debug, info};

/// 通知分发器
pub struct NotificationDispatcher {
    transport: Box<dyn MailTransport>,
    to_email: String,
    from_email: String,
    subject: String,
}

impl NotificationDispatcher {
    /// 创建新的分发器
    pub fn new(config: &MonitorConfig, transport: Box<dyn MailTransport>) -> Self {
        info!(transport = transport.name(), to = %config.to_email, "Using mail transport");
        Self {
            transport,
            to_email: config.to_email.clone(),
            from_email: config.from_email.clone(),
            subject: config.subject.clone(),
        }
    }

    /// 批次非空时发送一封通知
    ///
    /// 批次为空返回 `Ok(None)`，投递层不会被调用。投递失败直接向上返回，不重试。
    pub fn dispatch_if_non_empty(
        &self,
        messages: &[String],
    ) -> Result<Option<SendResult>, TransportError> {
        let Some(notification) =
            Notification::from_batch(messages, &self.to_email, &self.from_email, &self.subject)
        else {
            debug!("Batch is empty, nothing to send");
            return Ok(None);
        };

        info!(
            transport = self.transport.name(),
            messages = messages.len(),
            "Dispatching batch notification"
        );
        self.transport.deliver(&notification).map(Some)
    }

    pub fn transport_name(&self) -> &str {
        self.transport.name()
    }
}
