//! supervisor event listener 协议

pub mod fields;
pub mod frame;

pub use fields::Fields;
pub use frame::{EventChannel, RawEvent, OK_TOKEN, READY_TOKEN};
