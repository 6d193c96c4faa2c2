//! 批处理状态机
//!
//! 每个 TICK_60 累加一次计数，达到配置的周期后 flush：先清空窗口，再把
//! 清空前的消息交给分发器。状态变化事件生成的消息追加到窗口，并立即写到
//! 诊断流。窗口只在 flush 时清空，被抑制的事件不影响窗口。

use std::io::Write;

use tracing::{debug, info};

use super::clock::{Clock, SystemClock};
use super::policy::MonitorPolicy;
use crate::error::{ConfigError, MonitorError, Result};
use crate::event::{Event, EventCategory};
use crate::notification::{NotificationDispatcher, SendResult};

/// 当前批处理窗口
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchWindow {
    elapsed_ticks: u32,
    messages: Vec<String>,
}

impl BatchWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前窗口已经过的 tick 数（分钟）
    pub fn elapsed_ticks(&self) -> u32 {
        self.elapsed_ticks
    }

    /// 按到达顺序排列的消息
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn push(&mut self, message: String) {
        self.messages.push(message);
    }

    fn tick(&mut self) -> u32 {
        self.elapsed_ticks += 1;
        self.elapsed_ticks
    }

    /// 取出全部消息并重置计数
    fn take(&mut self) -> Vec<String> {
        self.elapsed_ticks = 0;
        std::mem::take(&mut self.messages)
    }
}

/// 单个事件的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 非关注事件，状态不变
    Ignored,
    /// 关注事件但被策略抑制
    Suppressed,
    /// 消息已追加到窗口
    Appended,
    /// tick 已计数，未到周期
    Counted(u32),
    /// 到达周期并 flush；`None` 表示窗口为空未发送
    Flushed(Option<SendResult>),
}

/// 批处理监控
pub struct BatchMonitor<D> {
    policy: Box<dyn MonitorPolicy>,
    dispatcher: NotificationDispatcher,
    clock: Box<dyn Clock>,
    interval_ticks: u32,
    window: BatchWindow,
    diagnostic: D,
}

impl<D: Write> BatchMonitor<D> {
    /// 创建监控；`diagnostic` 接收每条未被抑制的消息（生产环境为 stderr）
    ///
    /// 周期为 0 时返回 [`ConfigError::InvalidInterval`]。
    pub fn new(
        policy: Box<dyn MonitorPolicy>,
        dispatcher: NotificationDispatcher,
        interval_ticks: u32,
        diagnostic: D,
    ) -> std::result::Result<Self, ConfigError> {
        if interval_ticks == 0 {
            return Err(ConfigError::InvalidInterval(interval_ticks));
        }
        Ok(Self {
            policy,
            dispatcher,
            clock: Box::new(SystemClock),
            interval_ticks,
            window: BatchWindow::new(),
            diagnostic,
        })
    }

    /// 替换时钟（用于测试）
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn policy(&self) -> &dyn MonitorPolicy {
        self.policy.as_ref()
    }

    pub fn window(&self) -> &BatchWindow {
        &self.window
    }

    /// 当前窗口已累计的分钟数
    pub fn batch_minutes(&self) -> u32 {
        self.window.elapsed_ticks()
    }

    pub fn diagnostic(&self) -> &D {
        &self.diagnostic
    }

    /// 按类别处理一个事件
    pub fn handle_event(&mut self, event: &Event) -> Result<Outcome> {
        match event.category {
            EventCategory::LifecycleTransition => self.on_lifecycle_event(event),
            EventCategory::TimerTick => self.on_tick(),
            EventCategory::Other => {
                debug!(eventname = %event.name(), "Ignoring event");
                Ok(Outcome::Ignored)
            }
        }
    }

    pub fn on_tick(&mut self) -> Result<Outcome> {
        let elapsed = self.window.tick();
        if elapsed < self.interval_ticks {
            debug!(elapsed, interval = self.interval_ticks, "Tick counted");
            return Ok(Outcome::Counted(elapsed));
        }
        self.flush().map(Outcome::Flushed)
    }

    pub fn on_lifecycle_event(&mut self, event: &Event) -> Result<Outcome> {
        let Some(message) = self.policy.compose(event, self.clock.as_ref())? else {
            debug!(eventname = %event.name(), policy = self.policy.name(), "Event suppressed");
            return Ok(Outcome::Suppressed);
        };

        writeln!(self.diagnostic, "{}", message)
            .and_then(|_| self.diagnostic.flush())
            .map_err(MonitorError::Diagnostic)?;
        self.window.push(message);

        debug!(pending = self.window.messages().len(), "Message added to batch");
        Ok(Outcome::Appended)
    }

    /// 窗口先清空再投递，投递失败时消息不会重发
    fn flush(&mut self) -> Result<Option<SendResult>> {
        let messages = self.window.take();
        info!(
            messages = messages.len(),
            transport = self.dispatcher.transport_name(),
            "Batch interval reached"
        );
        Ok(self.dispatcher.dispatch_if_non_empty(&messages)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MonitorConfig;
    use crate::error::TransportError;
    use crate::monitor::clock::FixedClock;
    use crate::monitor::policy::MonitorKind;
    use crate::notification::{MailTransport, Notification};
    use crate::protocol::Fields;
    use chrono::NaiveDate;
    use std::sync::{Arc, Mutex};

    const UNEXPECTED: &str = "2010-07-20 18:56:40,099 -- Process bar:foo (pid 58597) died unexpectedly";

    #[derive(Clone, Default)]
    struct MockTransport {
        sent: Arc<Mutex<Vec<Notification>>>,
        fail: bool,
    }

    impl MockTransport {
        fn count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    impl MailTransport for MockTransport {
        fn name(&self) -> &str {
            "mock"
        }

        fn deliver(&self, notification: &Notification) -> std::result::Result<SendResult, TransportError> {
            self.sent.lock().unwrap().push(notification.clone());
            if self.fail {
                return Err(TransportError::CommandFailed {
                    status: "exit status: 75".to_string(),
                    stderr: "relay denied".to_string(),
                });
            }
            Ok(SendResult::Sent)
        }
    }

    fn monitor(interval: u32, transport: &MockTransport) -> BatchMonitor<Vec<u8>> {
        let config = MonitorConfig::new("testTo@blah.com", "testFrom@blah.com")
            .with_subject("Test Alert")
            .with_interval(interval);
        let dispatcher = NotificationDispatcher::new(&config, Box::new(transport.clone()));
        let clock = FixedClock(
            NaiveDate::from_ymd_opt(2010, 7, 20)
                .unwrap()
                .and_hms_milli_opt(18, 56, 40, 99)
                .unwrap(),
        );
        BatchMonitor::new(MonitorKind::Crash.policy(), dispatcher, interval, Vec::new())
            .unwrap()
            .with_clock(clock)
    }

    fn event(category: EventCategory, eventname: &str, payload: &str) -> Event {
        Event {
            category,
            headers: Fields::parse(&format!("ver:3.0 eventname:{} len:{}", eventname, payload.len())).unwrap(),
            payload: payload.to_string(),
        }
    }

    fn exited(name: &str, group: &str, expected: i32) -> Event {
        event(
            EventCategory::LifecycleTransition,
            "PROCESS_STATE_EXITED",
            &format!(
                "processname:{} groupname:{} from_state:RUNNING expected:{} pid:58597",
                name, group, expected
            ),
        )
    }

    fn tick() -> Event {
        event(EventCategory::TimerTick, "TICK_60", "when:1279665240")
    }

    fn diagnostic(m: &BatchMonitor<Vec<u8>>) -> String {
        String::from_utf8(m.diagnostic().clone()).unwrap()
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let config = MonitorConfig::new("testTo@blah.com", "testFrom@blah.com");
        let dispatcher = NotificationDispatcher::new(&config, Box::new(MockTransport::default()));
        let err = BatchMonitor::new(MonitorKind::Crash.policy(), dispatcher, 0, Vec::new())
            .err()
            .unwrap();
        assert_eq!(err, ConfigError::InvalidInterval(0));
    }

    #[test]
    fn test_expected_exit_is_suppressed() {
        let transport = MockTransport::default();
        let mut m = monitor(1, &transport);

        assert_eq!(m.handle_event(&exited("foo", "bar", 1)).unwrap(), Outcome::Suppressed);
        assert!(m.window().messages().is_empty());
        assert_eq!(diagnostic(&m), "");
    }

    #[test]
    fn test_unexpected_exit_is_appended_and_written() {
        let transport = MockTransport::default();
        let mut m = monitor(1, &transport);

        assert_eq!(m.handle_event(&exited("foo", "bar", 0)).unwrap(), Outcome::Appended);
        assert_eq!(m.window().messages(), [UNEXPECTED]);
        assert_eq!(diagnostic(&m), format!("{}\n", UNEXPECTED));
    }

    #[test]
    fn test_other_events_leave_window_unchanged() {
        let transport = MockTransport::default();
        let mut m = monitor(3, &transport);
        m.handle_event(&exited("foo", "bar", 0)).unwrap();
        m.handle_event(&tick()).unwrap();
        let before = m.window().clone();

        for name in ["PROCESS_STATE_FATAL", "PROCESS_STATE_RUNNING", "TICK_5", "SUPERVISOR_STATE_CHANGE_RUNNING"] {
            let ev = event(EventCategory::Other, name, "processname:foo groupname:bar expected:0 pid:1");
            assert_eq!(m.handle_event(&ev).unwrap(), Outcome::Ignored);
        }

        assert_eq!(m.window(), &before);
        assert_eq!(transport.count(), 0);
    }

    #[test]
    fn test_tick_interval_not_expired() {
        let transport = MockTransport::default();
        let mut m = monitor(3, &transport);
        m.handle_event(&exited("foo", "bar", 0)).unwrap();

        assert_eq!(m.handle_event(&tick()).unwrap(), Outcome::Counted(1));
        assert_eq!(m.batch_minutes(), 1);
        assert_eq!(m.handle_event(&tick()).unwrap(), Outcome::Counted(2));
        assert_eq!(m.batch_minutes(), 2);

        assert_eq!(m.window().messages().len(), 1);
        assert_eq!(transport.count(), 0);

        assert_eq!(m.handle_event(&tick()).unwrap(), Outcome::Flushed(Some(SendResult::Sent)));
        assert_eq!(m.batch_minutes(), 0);
        assert_eq!(transport.count(), 1);
    }

    #[test]
    fn test_tick_interval_expired_with_msgs() {
        let transport = MockTransport::default();
        let mut m = monitor(1, &transport);
        m.handle_event(&exited("foo", "bar", 0)).unwrap();
        m.handle_event(&exited("bark", "dog", 0)).unwrap();
        assert_eq!(m.window().messages().len(), 2);

        m.handle_event(&tick()).unwrap();

        assert!(m.window().messages().is_empty());
        assert_eq!(m.batch_minutes(), 0);
        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0],
            Notification {
                to: "testTo@blah.com".to_string(),
                from: "testFrom@blah.com".to_string(),
                subject: "Test Alert".to_string(),
                body: "2010-07-20 18:56:40,099 -- Process bar:foo (pid 58597) died unexpectedly\n\
                       2010-07-20 18:56:40,099 -- Process dog:bark (pid 58597) died unexpectedly"
                    .to_string(),
            }
        );
    }

    #[test]
    fn test_tick_interval_expired_without_msgs() {
        let transport = MockTransport::default();
        let mut m = monitor(1, &transport);

        assert_eq!(m.handle_event(&tick()).unwrap(), Outcome::Flushed(None));
        assert_eq!(transport.count(), 0);
        assert_eq!(m.batch_minutes(), 0);
    }

    #[test]
    fn test_transport_failure_still_clears_window() {
        let transport = MockTransport {
            fail: true,
            ..Default::default()
        };
        let mut m = monitor(1, &transport);
        m.handle_event(&exited("foo", "bar", 0)).unwrap();

        let err = m.handle_event(&tick()).unwrap_err();
        assert!(matches!(err, MonitorError::Transport(_)));
        assert_eq!(m.window(), &BatchWindow::new());
        assert_eq!(transport.count(), 1);
    }

    #[test]
    fn test_parse_error_propagates_and_window_untouched() {
        let transport = MockTransport::default();
        let mut m = monitor(1, &transport);
        let ev = event(
            EventCategory::LifecycleTransition,
            "PROCESS_STATE_EXITED",
            "processname:foo groupname:bar pid:1",
        );

        assert!(matches!(m.handle_event(&ev), Err(MonitorError::Parse(_))));
        assert!(m.window().is_empty());
        assert_eq!(diagnostic(&m), "");
    }

    #[test]
    fn test_messages_keep_arrival_order_across_ticks() {
        let transport = MockTransport::default();
        let mut m = monitor(3, &transport);
        let names = ["a", "b", "c", "a", "b"];

        for (i, name) in names.iter().enumerate() {
            m.handle_event(&exited(name, "grp", 0)).unwrap();
            if i % 2 == 1 {
                m.handle_event(&tick()).unwrap();
            }
        }
        assert_eq!(m.batch_minutes(), 2);
        m.handle_event(&tick()).unwrap();

        let sent = transport.sent.lock().unwrap();
        let lines: Vec<&str> = sent[0].body.lines().collect();
        assert_eq!(lines.len(), 5);
        for (line, name) in lines.iter().zip(names) {
            assert!(line.ends_with(&format!("Process grp:{} (pid 58597) died unexpectedly", name)));
        }
    }
}
