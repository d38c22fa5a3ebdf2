//! Item mutation handlers
//!
//! All three honor the force-error header before their artificial delay.

use axum::{extract::Path, http::HeaderMap, Json};
use serde::Serialize;
use std::time::Duration;

use crate::api::fault::check_force_error;
use crate::utils::AppError;

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub method: &'static str,
    pub id: String,
    pub status: &'static str,
}

pub async fn update_item(
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ItemResponse>, AppError> {
    check_force_error(&headers)?;
    tokio::time::sleep(Duration::from_millis(100)).await;
    Ok(Json(ItemResponse {
        method: "PUT",
        id,
        status: "updated",
    }))
}

pub async fn patch_item(
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ItemResponse>, AppError> {
    check_force_error(&headers)?;
    Ok(Json(ItemResponse {
        method: "PATCH",
        id,
        status: "patched",
    }))
}

pub async fn delete_item(
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ItemResponse>, AppError> {
    check_force_error(&headers)?;
    tokio::time::sleep(Duration::from_millis(500)).await;
    Ok(Json(ItemResponse {
        method: "DELETE",
        id,
        status: "deleted",
    }))
}
