//! Ordered metric history and its periodic export.

mod error;
mod history;
mod sink;
mod writer;

pub use error::{MetricErr, Result};
pub use history::{MetricEntry, MetricHistoryStore};
pub use sink::{JsonLinesSink, LogSink, METRICS_FILE, MetricSink};
pub use writer::PeriodicWriter;
