//! Core types: time windows, tracing setup

pub mod time;
pub mod tracing;

pub use time::TimeWindow;
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
