use axum::http::Method;
use chrono::{DateTime, Local};
use uuid::Uuid;

use super::format::{method_style, LatencyBucket, LatencyThresholds, StatusClass, Style};

pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d - %H:%M:%S";

/// One inbound exchange, as seen by the access log.
///
/// Built when the middleware receives the request, completed once the
/// handler chain has produced a response, then rendered exactly once.
#[derive(Debug, Clone)]
pub struct RequestRecord {
    pub timestamp: DateTime<Local>,
    pub method: Method,
    /// Route path with the query string appended, if any
    pub path: String,
    pub client_host: String,
    pub correlation_id: Uuid,
    pub status: u16,
    pub latency_ms: f64,
    pub response_size: String,
}

impl RequestRecord {
    pub fn status_class(&self) -> StatusClass {
        StatusClass::classify(self.status)
    }

    pub fn latency_bucket(&self, thresholds: &LatencyThresholds) -> LatencyBucket {
        LatencyBucket::classify(self.latency_ms, thresholds)
    }

    /// Fixed-width, single-line rendering:
    /// timestamp, status, latency, size, client, method, path, correlation id.
    pub fn render(&self, thresholds: &LatencyThresholds, colored: bool) -> String {
        let timestamp = self.timestamp.format(TIMESTAMP_FORMAT).to_string();
        let columns = [
            Style::dim().paint(format!("{:<19}", timestamp), colored),
            self.status_class()
                .style()
                .paint(format!("{:<6}", self.status), colored),
            self.latency_bucket(thresholds)
                .style()
                .paint(format!("{:>8.2}ms", self.latency_ms), colored),
            Style::dim().paint(format!("{:>7}", self.response_size), colored),
            Style::dim().paint(format!("{:<15}", self.client_host), colored),
            method_style(&self.method).paint(format!("{:<7}", self.method.as_str()), colored),
            Style::bold().paint(format!("{:<30}", self.path), colored),
            Style::fg(crossterm::style::Color::Cyan)
                .paint(self.correlation_id.to_string(), colored),
        ];
        columns.join(" ")
    }
}
