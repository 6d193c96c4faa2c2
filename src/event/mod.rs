//! 事件模型与分类

pub mod classify;

pub use classify::{Classifier, Event, EventCategory, TICK_EVENT};
