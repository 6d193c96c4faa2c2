//! 错误类型 - 事件监听器的错误分类
//!
//! - `FramingError`: 事件帧损坏或被截断，致命
//! - `ParseError`: 事件内容缺少必需字段，致命
//! - `TransportError`: 邮件投递失败，不重试
//! - `ConfigError`: 启动前的配置错误

use thiserror::Error;

/// 事件帧错误（来自 supervisor 的输入流）
#[derive(Debug, Error)]
pub enum FramingError {
    #[error("event header is missing the `len` field")]
    MissingLength,

    #[error("invalid payload length: {0:?}")]
    InvalidLength(String),

    #[error("malformed header token: {0:?}")]
    MalformedToken(String),

    #[error("input closed inside a header line")]
    TruncatedHeader,

    #[error("payload truncated: expected {expected} bytes, read {read}")]
    Truncated { expected: usize, read: usize },

    #[error("event channel I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// 事件内容解析错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("event header is missing required field `{0}`")]
    MissingHeader(&'static str),

    #[error("event payload is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` is not an integer: {value:?}")]
    InvalidInteger { field: &'static str, value: String },

    #[error("malformed payload token: {0:?}")]
    MalformedToken(String),
}

/// 邮件投递错误
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("mail command not found: {0}")]
    CommandNotFound(String),

    #[error("failed to spawn mail command `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("mail command I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("mail command exited with {status}: {stderr}")]
    CommandFailed { status: String, stderr: String },
}

/// 启动配置错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("must run as a supervisor event listener (SUPERVISOR_SERVER_URL is not set)")]
    NotSupervised,

    #[error("missing required address: {0}")]
    MissingAddress(&'static str),

    #[error("invalid {field} address: {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("batch interval must be at least 1 minute, got {0}")]
    InvalidInterval(u32),
}

/// 监听循环的统一错误
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(transparent)]
    Framing(#[from] FramingError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("diagnostic stream write failed: {0}")]
    Diagnostic(#[source] std::io::Error),
}

pub type Result<T, E = MonitorError> = std::result::Result<T, E>;
