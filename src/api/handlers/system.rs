use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Redirect},
    Json,
};
use rand::Rng;
use serde_json::{json, Value};
use std::time::Duration;

use crate::utils::AppError;

const ALLOWED_METHODS: &str = "OPTIONS, GET, POST, PUT, PATCH, DELETE, HEAD";

pub async fn root() -> Json<Value> {
    Json(json!({ "hello": "world" }))
}

pub async fn tags() -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(50)).await;
    Json(json!({ "tags": ["axum", "logging", "tracing"] }))
}

pub async fn ps() -> Json<Value> {
    Json(json!({ "ps": "ok" }))
}

pub async fn pull() -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(120)).await;
    Json(json!({ "pulled": true }))
}

pub async fn status_head() -> impl IntoResponse {
    (StatusCode::OK, [("x-system-status", "OK")])
}

pub async fn options() -> impl IntoResponse {
    (StatusCode::OK, [(header::ALLOW, ALLOWED_METHODS)])
}

/// 307 to a random item
pub async fn redirect() -> Redirect {
    let id: u32 = rand::thread_rng().gen_range(1000..=9999);
    Redirect::temporary(&format!("/api/items/{}", id))
}

pub async fn not_found() -> AppError {
    AppError::not_found("Resource not found")
}
