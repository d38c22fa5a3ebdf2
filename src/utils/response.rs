use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

pub const INTERNAL_ERROR_BODY: &str = "Internal server error";

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Marker left on a response whose handler failed unexpectedly.
///
/// The access-log middleware takes it off, reports `detail`, and replaces the
/// response with a generic 500 so the cause never reaches the client.
#[derive(Debug, Clone)]
pub struct HandlerFault {
    pub detail: String,
}

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A deliberate error status, surfaced to the client as-is
    #[error("{status}: {}", .body.error)]
    Simulated { status: StatusCode, body: ErrorBody },
    /// Anything the handler did not expect; contained at the middleware boundary
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl AppError {
    pub fn simulated(status: StatusCode, message: &str) -> Self {
        Self::Simulated {
            status,
            body: ErrorBody {
                error: message.to_string(),
                status: None,
                detail: None,
            },
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::simulated(StatusCode::NOT_FOUND, message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Simulated { status, body } => (status, Json(body)).into_response(),
            AppError::Unexpected(err) => {
                let mut response = internal_error_response();
                response.extensions_mut().insert(HandlerFault {
                    detail: format!("{:?}", err),
                });
                response
            }
        }
    }
}

/// The generic plain-text 500 every contained failure turns into
pub fn internal_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        INTERNAL_ERROR_BODY,
    )
        .into_response()
}
