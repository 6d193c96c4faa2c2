//! 事件分类 - 根据 `eventname` 判断事件类别

use std::collections::HashSet;

use crate::error::ParseError;
use crate::protocol::{Fields, RawEvent};

/// supervisor 每 60 秒发送一次的定时事件
pub const TICK_EVENT: &str = "TICK_60";

/// 事件类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventCategory {
    /// 监控关心的进程状态变化（如 PROCESS_STATE_EXITED）
    LifecycleTransition,
    /// 定时 tick，批处理窗口的唯一时间来源
    TimerTick,
    /// 其它事件，不改变任何状态
    Other,
}

/// 分类后的事件，处理一次后丢弃
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub category: EventCategory,
    pub headers: Fields,
    pub payload: String,
}

impl Event {
    pub fn name(&self) -> &str {
        self.headers.get("eventname").unwrap_or_default()
    }

    /// 解析 payload 字段
    pub fn payload_fields(&self) -> Result<Fields, ParseError> {
        Fields::parse_payload(&self.payload)
    }
}

/// 事件分类器
#[derive(Debug, Clone)]
pub struct Classifier {
    interesting: HashSet<String>,
}

impl Classifier {
    /// 用监控关心的状态变化事件名创建分类器
    pub fn new<I, S>(interesting: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            interesting: interesting.into_iter().map(Into::into).collect(),
        }
    }

    pub fn classify(&self, headers: &Fields) -> Result<EventCategory, ParseError> {
        let name = headers
            .get("eventname")
            .ok_or(ParseError::MissingHeader("eventname"))?;

        let category = if self.interesting.contains(name) {
            EventCategory::LifecycleTransition
        } else if name == TICK_EVENT {
            EventCategory::TimerTick
        } else {
            EventCategory::Other
        };
        Ok(category)
    }

    /// 将原始事件帧转换为分类后的事件
    pub fn event(&self, raw: RawEvent) -> Result<Event, ParseError> {
        let category = self.classify(&raw.headers)?;
        Ok(Event {
            category,
            headers: raw.headers,
            payload: raw.payload,
        })
    }
}
