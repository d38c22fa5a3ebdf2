//! Error injection
//!
//! Handlers that opt in call [`check_force_error`] before doing any work. A
//! request carrying `x-force-error: <status>` then ends with that status.

use axum::http::{HeaderMap, StatusCode};

use crate::utils::{AppError, ErrorBody};

pub const FORCE_ERROR_HEADER: &str = "x-force-error";

/// No-op unless the force-error header holds an integer.
///
/// Integers that are not HTTP status codes (outside 100..=999) are treated as
/// an unexpected failure.
pub fn check_force_error(headers: &HeaderMap) -> Result<(), AppError> {
    let requested = headers
        .get(FORCE_ERROR_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<i64>().ok());

    let Some(code) = requested else {
        return Ok(());
    };

    let status = u16::try_from(code)
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .ok_or_else(|| anyhow::anyhow!("{} requested invalid status {}", FORCE_ERROR_HEADER, code))?;

    tracing::debug!(status = status.as_u16(), "forcing error response");
    Err(AppError::Simulated {
        status,
        body: ErrorBody {
            error: "Simulated error".to_string(),
            status: Some(status.as_u16()),
            detail: Some(format!("forced via {} header", FORCE_ERROR_HEADER)),
        },
    })
}
