//! Access Log
//!
//! Per-request line formatting and the sink the access-log middleware writes to:
//! - `format`: status/latency/method styles and size labels
//! - `record`: the per-request record and its column layout
//! - `sink`: where rendered lines go

pub mod format;
pub mod record;
pub mod sink;

use std::sync::Arc;

use crate::config::AccessLogConfig;

pub use format::LatencyThresholds;
pub use record::RequestRecord;
pub use sink::{ConsoleSink, LogSink};

#[cfg(test)]
pub use sink::MemorySink;

/// Shared access-log state handed to the middleware
#[derive(Clone)]
pub struct AccessLog {
    sink: Arc<dyn LogSink>,
    thresholds: LatencyThresholds,
    favicon_cache_secs: u64,
    colored: bool,
}

impl AccessLog {
    pub fn new(sink: Arc<dyn LogSink>, config: &AccessLogConfig) -> Self {
        Self {
            sink,
            thresholds: LatencyThresholds {
                warn_ms: config.warn_latency_ms,
                slow_ms: config.slow_latency_ms,
            },
            favicon_cache_secs: config.favicon_cache_secs,
            colored: config.color.enabled(),
        }
    }

    pub fn favicon_cache_control(&self) -> String {
        format!("public, max-age={}", self.favicon_cache_secs)
    }

    pub fn emit(&self, record: &RequestRecord) {
        let line = record.render(&self.thresholds, self.colored);
        self.sink.write_line(&line);
    }
}
