use axum::{
    middleware as axum_middleware,
    routing::{get, head, options, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::access_log::AccessLog;
use crate::api::handlers;
use crate::api::middleware::access_log_middleware;

pub fn create_router(access_log: AccessLog) -> Router {
    let api_routes = Router::new()
        .route("/tags", get(handlers::system::tags))
        .route("/ps", get(handlers::system::ps))
        .route("/pull", post(handlers::system::pull))
        .route("/status", head(handlers::system::status_head))
        .route("/options", options(handlers::system::options))
        .route("/redirect", get(handlers::system::redirect))
        // Item mutations (honor x-force-error)
        .route(
            "/items/:id",
            put(handlers::items::update_item)
                .patch(handlers::items::patch_item)
                .delete(handlers::items::delete_item),
        )
        // Direct error simulations
        .route("/error/:code", get(handlers::errors::simulate_error));

    Router::new()
        .route("/", get(handlers::system::root))
        .nest("/api", api_routes)
        .fallback(handlers::system::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn_with_state(
            access_log,
            access_log_middleware,
        ))
}
