//! Access Log Middleware
//!
//! Wraps every exchange: assigns a correlation id, times the full handler
//! path, contains handler failures, and writes one access line per request.

use axum::{
    body::{Body, HttpBody},
    extract::{ConnectInfo, State},
    http::{header, HeaderName, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures::FutureExt;
use std::any::Any;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::access_log::{AccessLog, RequestRecord};
use crate::utils::{internal_error_response, HandlerFault};

pub const FAVICON_PATH: &str = "/favicon.ico";
pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// How the handler chain finished
enum Outcome {
    Completed(Response),
    Faulted(String),
}

impl Outcome {
    fn from_response(mut response: Response) -> Self {
        match response.extensions_mut().remove::<HandlerFault>() {
            Some(fault) => Outcome::Faulted(fault.detail),
            None => Outcome::Completed(response),
        }
    }
}

pub async fn access_log_middleware(
    State(access_log): State<AccessLog>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.uri().path() == FAVICON_PATH {
        return (
            StatusCode::NO_CONTENT,
            [(header::CACHE_CONTROL, access_log.favicon_cache_control())],
        )
            .into_response();
    }

    let start = Instant::now();
    let timestamp = chrono::Local::now();
    let client_host = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let correlation_id = Uuid::new_v4();
    let method = request.method().clone();
    let path = match request.uri().query() {
        Some(query) => format!("{}?{}", request.uri().path(), query),
        None => request.uri().path().to_string(),
    };

    let span = tracing::info_span!("request", request_id = %correlation_id);
    let outcome = match AssertUnwindSafe(next.run(request).instrument(span))
        .catch_unwind()
        .await
    {
        Ok(response) => Outcome::from_response(response),
        Err(panic) => Outcome::Faulted(panic_message(panic.as_ref())),
    };

    let mut response = match outcome {
        Outcome::Completed(response) => response,
        Outcome::Faulted(detail) => {
            tracing::error!(
                request_id = %correlation_id,
                method = %method,
                path = %path,
                "Unhandled failure while handling request: {}",
                detail
            );
            internal_error_response()
        }
    };

    if let Ok(value) = HeaderValue::from_str(&correlation_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER.clone(), value);
    }

    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    let record = RequestRecord {
        timestamp,
        method,
        path,
        client_host,
        correlation_id,
        status: response.status().as_u16(),
        latency_ms,
        response_size: crate::access_log::format::size_label(
            response_length(&response).as_deref(),
        ),
    };
    access_log.emit(&record);

    response
}

/// `Content-Length` as it will go out on the wire: the header when the handler
/// set one, otherwise the exact body size hyper will advertise.
fn response_length(response: &Response) -> Option<String> {
    if let Some(value) = response.headers().get(header::CONTENT_LENGTH) {
        return Some(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    response
        .body()
        .size_hint()
        .exact()
        .map(|bytes| bytes.to_string())
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("handler panicked: {}", message)
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("handler panicked: {}", message)
    } else {
        "handler panicked".to_string()
    }
}
