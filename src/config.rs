//! 监听器配置 - 启动时构建一次，运行期间不可变

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// supervisor 为事件监听器子进程设置的环境变量
pub const SUPERVISOR_ENV: &str = "SUPERVISOR_SERVER_URL";

pub const DEFAULT_SUBJECT: &str = "Alert from supervisord";

pub const DEFAULT_SENDMAIL: &str = "/usr/sbin/sendmail -t -i";

fn default_interval() -> u32 {
    1
}

fn default_subject() -> String {
    DEFAULT_SUBJECT.to_string()
}

/// 批处理监控配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// 批处理周期（分钟），即每个窗口累计的 TICK_60 数
    #[serde(default = "default_interval")]
    pub interval: u32,
    /// 收件人
    pub to_email: String,
    /// 发件人
    pub from_email: String,
    /// 邮件主题
    #[serde(default = "default_subject")]
    pub subject: String,
}

impl MonitorConfig {
    pub fn new(to_email: impl Into<String>, from_email: impl Into<String>) -> Self {
        Self {
            interval: default_interval(),
            to_email: to_email.into(),
            from_email: from_email.into(),
            subject: default_subject(),
        }
    }

    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// 窗口长度（tick 数）
    pub fn window_interval_ticks(&self) -> u32 {
        self.interval
    }

    /// 启动前校验
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval == 0 {
            return Err(ConfigError::InvalidInterval(self.interval));
        }
        check_address("to", &self.to_email)?;
        check_address("from", &self.from_email)?;
        Ok(())
    }
}

fn check_address(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingAddress(field));
    }
    // 地址会原样写进邮件头
    if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ConfigError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// 确认当前进程运行在 supervisor 之下
pub fn ensure_supervised() -> Result<(), ConfigError> {
    check_supervised(std::env::var_os(SUPERVISOR_ENV).is_some())
}

fn check_supervised(marker_present: bool) -> Result<(), ConfigError> {
    if marker_present {
        Ok(())
    } else {
        Err(ConfigError::NotSupervised)
    }
}
