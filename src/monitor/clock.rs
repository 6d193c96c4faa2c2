//! 时钟 - 消息时间戳来源，测试时可替换

use chrono::{Local, NaiveDateTime};

/// 消息时间戳格式：`2010-07-20 18:56:40,099`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// 墙上时钟
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// 本地时间
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// 固定时间（用于测试）
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// 格式化时间戳（毫秒精度）
pub fn format_timestamp(time: NaiveDateTime) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}
