//! CLI command handling

pub mod batch;

pub use batch::*;
