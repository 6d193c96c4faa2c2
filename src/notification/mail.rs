//! 批量通知邮件

use serde::Serialize;

/// 一封待投递的通知邮件，只在 flush 时从非空批次构建
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub body: String,
}

impl Notification {
    /// 从批次消息构建通知；批次为空时返回 `None`
    pub fn from_batch(
        messages: &[String],
        to: impl Into<String>,
        from: impl Into<String>,
        subject: impl Into<String>,
    ) -> Option<Self> {
        if messages.is_empty() {
            return None;
        }
        Some(Self {
            to: to.into(),
            from: from.into(),
            subject: subject.into(),
            body: messages.join("\n"),
        })
    }

    /// 渲染为 RFC 822 文本（用于 `sendmail -t`）
    pub fn to_rfc822(&self) -> String {
        format!(
            "To: {}\r\nFrom: {}\r\nSubject: {}\r\nMIME-Version: 1.0\r\n\
             Content-Type: text/plain; charset=utf-8\r\n\
             Content-Transfer-Encoding: 8bit\r\n\r\n{}\r\n",
            self.to,
            self.from,
            self.subject,
            self.body.replace('\n', "\r\n"),
        )
    }
}
