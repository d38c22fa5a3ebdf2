//! Pure display helpers for access lines
//!
//! Maps statuses, latencies and methods to a display [`Style`], and a
//! `Content-Length` value to a human readable size.

use axum::http::Method;
use crossterm::style::{Color, Stylize};

/// Foreground/background pair plus emphasis for one column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
    pub dim: bool,
}

impl Style {
    pub const fn fg(color: Color) -> Self {
        Self { fg: Some(color), bg: None, bold: false, dim: false }
    }

    pub const fn on(fg: Color, bg: Color) -> Self {
        Self { fg: Some(fg), bg: Some(bg), bold: false, dim: false }
    }

    pub const fn dim() -> Self {
        Self { fg: None, bg: None, bold: false, dim: true }
    }

    pub const fn bold() -> Self {
        Self { fg: None, bg: None, bold: true, dim: false }
    }

    pub const fn bolded(self) -> Self {
        Self { bold: true, ..self }
    }

    /// Wraps `text` in ANSI escapes, or returns it untouched when `colored` is off
    pub fn paint(&self, text: String, colored: bool) -> String {
        if !colored {
            return text;
        }
        let mut styled = text.stylize();
        if let Some(fg) = self.fg {
            styled = styled.with(fg);
        }
        if let Some(bg) = self.bg {
            styled = styled.on(bg);
        }
        if self.bold {
            styled = styled.bold();
        }
        if self.dim {
            styled = styled.dim();
        }
        styled.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    ServerError,
    ClientError,
    Redirect,
    Success,
}

impl StatusClass {
    pub fn classify(status: u16) -> Self {
        match status {
            500.. => StatusClass::ServerError,
            400..=499 => StatusClass::ClientError,
            300..=399 => StatusClass::Redirect,
            _ => StatusClass::Success,
        }
    }

    pub fn style(self) -> Style {
        match self {
            StatusClass::ServerError => Style::on(Color::White, Color::DarkRed),
            StatusClass::ClientError => Style::on(Color::Black, Color::DarkYellow),
            StatusClass::Redirect => Style::on(Color::Black, Color::DarkCyan),
            StatusClass::Success => Style::on(Color::Black, Color::DarkGreen),
        }
    }
}

/// Latency cut-offs in milliseconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencyThresholds {
    pub warn_ms: f64,
    pub slow_ms: f64,
}

impl Default for LatencyThresholds {
    fn default() -> Self {
        Self { warn_ms: 100.0, slow_ms: 500.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyBucket {
    Normal,
    Warning,
    Slow,
}

impl LatencyBucket {
    pub fn classify(latency_ms: f64, thresholds: &LatencyThresholds) -> Self {
        if latency_ms >= thresholds.slow_ms {
            LatencyBucket::Slow
        } else if latency_ms >= thresholds.warn_ms {
            LatencyBucket::Warning
        } else {
            LatencyBucket::Normal
        }
    }

    pub fn style(self) -> Style {
        match self {
            LatencyBucket::Slow => Style::fg(Color::Red).bolded(),
            LatencyBucket::Warning => Style::fg(Color::Yellow),
            LatencyBucket::Normal => Style::fg(Color::Green),
        }
    }
}

pub fn method_style(method: &Method) -> Style {
    match method.as_str() {
        "GET" => Style::on(Color::White, Color::Blue),
        "POST" => Style::on(Color::White, Color::Magenta),
        "PUT" => Style::on(Color::Black, Color::DarkYellow),
        "DELETE" => Style::on(Color::White, Color::Red),
        "HEAD" => Style::on(Color::White, Color::DarkMagenta),
        "OPTIONS" => Style::on(Color::White, Color::DarkGreen),
        "PATCH" => Style::on(Color::Black, Color::Yellow),
        _ => Style::on(Color::White, Color::Rgb { r: 0x33, g: 0x33, b: 0x33 }),
    }
}

/// Human readable size for a `Content-Length` value.
///
/// Missing or empty values render as `-`; values that are not a byte count are
/// shown verbatim.
pub fn size_label(content_length: Option<&str>) -> String {
    let raw = match content_length.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return "-".to_string(),
    };
    let bytes: u64 = match raw.parse() {
        Ok(bytes) => bytes,
        Err(_) => return raw.to_string(),
    };

    const KB: u64 = 1024;
    const MB: u64 = KB * KB;
    if bytes < KB {
        format!("{}B", bytes)
    } else if bytes < MB {
        format!("{:.1}KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1}MB", bytes as f64 / MB as f64)
    }
}
