//! 事件循环 - 单线程阻塞式 读取 → 处理 → 确认
//!
//! 输入流关闭时循环结束。未 flush 的消息直接丢弃，不在退出时补发。

use std::io::{BufRead, Write};

use tracing::{debug, info, warn};

use super::batch::{BatchMonitor, Outcome};
use crate::error::Result;
use crate::event::Classifier;
use crate::notification::SendResult;
use crate::protocol::EventChannel;

/// 一次运行的统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub events: u64,
    pub ticks: u64,
    pub appended: u64,
    pub suppressed: u64,
    pub flushes: u64,
    pub notifications_sent: u64,
    /// 退出时丢弃的未发送消息数
    pub dropped: u64,
}

impl RunSummary {
    fn record(&mut self, outcome: &Outcome) {
        self.events += 1;
        match outcome {
            Outcome::Ignored => {}
            Outcome::Suppressed => self.suppressed += 1,
            Outcome::Appended => self.appended += 1,
            Outcome::Counted(_) => self.ticks += 1,
            Outcome::Flushed(result) => {
                self.ticks += 1;
                self.flushes += 1;
                if matches!(result, Some(SendResult::Sent)) {
                    self.notifications_sent += 1;
                }
            }
        }
    }
}

/// supervisor 事件监听器
pub struct Listener<R, W, D> {
    channel: EventChannel<R, W>,
    classifier: Classifier,
    monitor: BatchMonitor<D>,
}

impl<R: BufRead, W: Write, D: Write> Listener<R, W, D> {
    pub fn new(channel: EventChannel<R, W>, monitor: BatchMonitor<D>) -> Self {
        let classifier = Classifier::new(monitor.policy().interesting_events().iter().copied());
        Self {
            channel,
            classifier,
            monitor,
        }
    }

    pub fn monitor(&self) -> &BatchMonitor<D> {
        &self.monitor
    }

    /// 运行直到输入关闭；任何错误都会终止循环
    pub fn run(&mut self) -> Result<RunSummary> {
        info!(
            policy = self.monitor.policy().name(),
            events = ?self.monitor.policy().interesting_events(),
            "Listening for supervisor events"
        );

        let mut summary = RunSummary::default();
        while let Some(raw) = self.channel.next_event()? {
            let event = self.classifier.event(raw)?;
            debug!(eventname = %event.name(), category = ?event.category, "Event received");

            let outcome = self.monitor.handle_event(&event)?;
            summary.record(&outcome);

            self.channel.acknowledge()?;
        }

        let pending = self.monitor.window().messages().len();
        if pending > 0 {
            warn!(dropped = pending, "Input closed with unsent messages; they are discarded");
            summary.dropped = pending as u64;
        }
        info!(?summary, "Event stream closed");
        Ok(summary)
    }

    pub fn into_parts(self) -> (EventChannel<R, W>, BatchMonitor<D>) {
        (self.channel, self.monitor)
    }
}
