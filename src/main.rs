use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod access_log;
mod api;
mod config;
mod services;
mod utils;

use crate::access_log::{AccessLog, ConsoleSink};
use crate::config::AppConfig;
use crate::services::traffic::TrafficGenerator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "access_log_harness=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = AppConfig::load()?;

    tracing::info!("Starting access-log harness v{}", env!("CARGO_PKG_VERSION"));

    // Access lines go straight to the console, one whole line per write
    let access_log = AccessLog::new(Arc::new(ConsoleSink), &config.access_log);
    let app = api::routes::create_router(access_log);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Self-traffic starts after its warm-up, by which time the listener is bound
    let traffic = if config.traffic.enabled {
        let generator = TrafficGenerator::new(&config.traffic, config.traffic_base_url())?;
        Some(generator.spawn())
    } else {
        tracing::info!("Traffic generator is disabled");
        None
    };

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    if let Some(handle) = traffic {
        let stats = handle.stop().await;
        tracing::info!(
            "Traffic generator issued {} requests ({} transport failures)",
            stats.issued,
            stats.failed
        );
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
