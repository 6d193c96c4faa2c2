//! 事件通道 - supervisor event listener 协议的帧处理
//!
//! 协议流程（每个事件一轮）：
//! 1. 监听器向 stdout 写 `READY\n`
//! 2. supervisor 写一行事件头（必须包含 `len`），随后恰好 `len` 字节的 payload
//! 3. 监听器处理完后写 `RESULT 2\nOK`
//!
//! 这里只负责帧，不解释事件内容。

use std::io::{BufRead, Read, Write};

use tracing::trace;

use super::fields::Fields;
use crate::error::{FramingError, ParseError};

/// 进入 READY 状态的令牌
pub const READY_TOKEN: &str = "READY\n";

/// 事件处理完成的确认令牌
pub const OK_TOKEN: &str = "RESULT 2\nOK";

/// 一个完整的原始事件帧
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub headers: Fields,
    pub payload: String,
}

/// 阻塞式事件通道，同一时间只有一个事件在处理
pub struct EventChannel<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> EventChannel<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// 通知 supervisor 可以接收下一个事件
    pub fn ready(&mut self) -> Result<(), FramingError> {
        self.output.write_all(READY_TOKEN.as_bytes())?;
        self.output.flush()?;
        Ok(())
    }

    /// 等待下一个事件帧
    ///
    /// 在事件头开始前遇到 EOF 返回 `Ok(None)`；帧中途 EOF 是 `FramingError`。
    pub fn next_event(&mut self) -> Result<Option<RawEvent>, FramingError> {
        self.ready()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if !line.ends_with('\n') {
            return Err(FramingError::TruncatedHeader);
        }

        let headers = Fields::parse(&line).map_err(|e| match e {
            ParseError::MalformedToken(token) => FramingError::MalformedToken(token),
            other => FramingError::MalformedToken(other.to_string()),
        })?;

        let raw_len = headers.get("len").ok_or(FramingError::MissingLength)?;
        let len: usize = raw_len
            .parse()
            .map_err(|_| FramingError::InvalidLength(raw_len.to_string()))?;

        // 缓冲区按实际到达的字节增长，不信任 `len`
        let mut buf = Vec::new();
        let read = (&mut self.input).take(len as u64).read_to_end(&mut buf)?;
        if read < len {
            return Err(FramingError::Truncated { expected: len, read });
        }

        trace!(len, "Event frame received");
        Ok(Some(RawEvent {
            headers,
            payload: String::from_utf8_lossy(&buf).into_owned(),
        }))
    }

    /// 确认当前事件已处理完毕，每个事件必须调用一次
    pub fn acknowledge(&mut self) -> Result<(), FramingError> {
        self.output.write_all(OK_TOKEN.as_bytes())?;
        self.output.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }
}
