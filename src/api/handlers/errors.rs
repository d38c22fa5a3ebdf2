//! Direct error simulations, one route per status

use axum::{extract::Path, http::StatusCode};
use std::time::Duration;

use crate::utils::AppError;

pub async fn simulate_error(Path(code): Path<u16>) -> AppError {
    match code {
        400 => AppError::simulated(StatusCode::BAD_REQUEST, "Invalid request parameters"),
        404 => AppError::not_found("Resource not found"),
        500 => {
            tokio::time::sleep(Duration::from_millis(150)).await;
            AppError::simulated(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
        503 => {
            tokio::time::sleep(Duration::from_millis(600)).await;
            AppError::simulated(
                StatusCode::SERVICE_UNAVAILABLE,
                "Service temporarily unavailable",
            )
        }
        _ => AppError::not_found("Resource not found"),
    }
}
