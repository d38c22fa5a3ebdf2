//! Synthetic Traffic Generator
//!
//! Background task that drives the service's own routes with randomized
//! requests, including force-error requests, so every access-log bucket shows
//! up without an external client. Transport failures never stop the loop.

pub mod operations;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::fault::FORCE_ERROR_HEADER;
use crate::config::TrafficConfig;

pub use operations::{default_operations, OperationSpec, PlannedRequest};
use operations::{resolve_path, INJECTABLE_METHODS, ITEM_PATH};

#[derive(Debug, thiserror::Error)]
pub enum TrafficError {
    #[error("traffic request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("operation table is empty")]
    NoOperations,
}

/// Totals reported when the generator stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrafficStats {
    /// Requests that got any HTTP response
    pub issued: u64,
    /// Requests that failed at the transport level
    pub failed: u64,
}

pub struct TrafficGenerator {
    client: reqwest::Client,
    base_url: String,
    operations: Vec<OperationSpec>,
    item_ids: RangeInclusive<u32>,
    warmup: Duration,
    delay_secs: (f64, f64),
    rng: StdRng,
}

impl TrafficGenerator {
    pub fn new(config: &TrafficConfig, base_url: String) -> Result<Self, TrafficError> {
        Self::with_operations(config, base_url, default_operations())
    }

    pub fn with_operations(
        config: &TrafficConfig,
        base_url: String,
        operations: Vec<OperationSpec>,
    ) -> Result<Self, TrafficError> {
        if operations.is_empty() {
            return Err(TrafficError::NoOperations);
        }

        // Redirects are part of the observed traffic, not something to chase
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            operations,
            item_ids: config.item_ids(),
            warmup: config.warmup(),
            delay_secs: (config.min_delay_secs, config.max_delay_secs),
            rng,
        })
    }

    /// Draws the next request uniformly from the operation table
    pub fn plan(&mut self) -> PlannedRequest {
        // with_operations rejects an empty table
        let spec = self.operations[self.rng.gen_range(0..self.operations.len())].clone();
        let id = self.rng.gen_range(self.item_ids.clone());

        match &spec {
            OperationSpec::Call { method, path } => PlannedRequest {
                method: method.clone(),
                path: resolve_path(path, id),
                force_error: None,
                spec: spec.clone(),
            },
            OperationSpec::InjectError { status } => {
                let method = INJECTABLE_METHODS
                    .choose(&mut self.rng)
                    .cloned()
                    .unwrap_or(reqwest::Method::PATCH);
                PlannedRequest {
                    method,
                    path: resolve_path(ITEM_PATH, id),
                    force_error: Some(*status),
                    spec: spec.clone(),
                }
            }
        }
    }

    pub fn next_delay(&mut self) -> Duration {
        let (min, max) = self.delay_secs;
        Duration::from_secs_f64(self.rng.gen_range(min..=max))
    }

    async fn send(&self, planned: &PlannedRequest) -> Result<reqwest::StatusCode, TrafficError> {
        let url = format!("{}{}", self.base_url, planned.path);
        let mut request = self.client.request(planned.method.clone(), url);
        if let Some(status) = planned.force_error {
            request = request.header(FORCE_ERROR_HEADER, status.to_string());
        }
        let response = request.send().await?;
        Ok(response.status())
    }

    /// Starts the loop on the runtime; it runs until the handle is stopped or dropped
    pub fn spawn(self) -> TrafficHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(shutdown_rx));
        TrafficHandle {
            shutdown: shutdown_tx,
            task,
        }
    }

    async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> TrafficStats {
        let mut stats = TrafficStats::default();

        if !pause(&mut shutdown, self.warmup).await {
            return stats;
        }
        tracing::info!("Starting background traffic generator targeting {}", self.base_url);

        loop {
            let planned = self.plan();
            tokio::select! {
                result = self.send(&planned) => match result {
                    Ok(status) => {
                        stats.issued += 1;
                        tracing::trace!(
                            method = %planned.method,
                            path = %planned.path,
                            status = status.as_u16(),
                            "traffic request answered"
                        );
                    }
                    Err(e) => {
                        stats.failed += 1;
                        tracing::debug!(method = %planned.method, path = %planned.path, "{}", e);
                    }
                },
                _ = shutdown.changed() => break,
            }

            let delay = self.next_delay();
            if !pause(&mut shutdown, delay).await {
                break;
            }
        }

        tracing::debug!("Traffic generator loop exited");
        stats
    }
}

/// Sleeps for `duration`; false if shutdown was requested meanwhile
async fn pause(shutdown: &mut watch::Receiver<bool>, duration: Duration) -> bool {
    if *shutdown.borrow() {
        return false;
    }
    tokio::select! {
        _ = tokio::time::sleep(duration) => true,
        _ = shutdown.changed() => false,
    }
}

pub struct TrafficHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<TrafficStats>,
}

impl TrafficHandle {
    /// Signals the loop to stop and waits for it
    pub async fn stop(self) -> TrafficStats {
        // An Err here means the task already finished and dropped its receiver
        let _ = self.shutdown.send(true);
        match self.task.await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!("Traffic generator task ended abnormally: {}", e);
                TrafficStats::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access_log::{AccessLog, MemorySink};
    use crate::api::routes::create_router;
    use crate::config::{AccessLogConfig, ColorMode};
    use std::collections::HashSet;
    use std::net::SocketAddr;
    use std::sync::Arc;

    fn fast_config(seed: u64) -> TrafficConfig {
        TrafficConfig {
            warmup_secs: 0.0,
            min_delay_secs: 0.0,
            max_delay_secs: 0.01,
            request_timeout_secs: 2.0,
            seed: Some(seed),
            ..TrafficConfig::default()
        }
    }

    #[test]
    fn test_rejects_empty_table() {
        let result =
            TrafficGenerator::with_operations(&fast_config(1), "http://127.0.0.1:1".into(), vec![]);
        assert!(matches!(result, Err(TrafficError::NoOperations)));
    }

    #[test]
    fn test_seeded_plan_covers_every_operation() {
        let mut generator =
            TrafficGenerator::new(&fast_config(7), "http://127.0.0.1:8000".into()).unwrap();
        let mut seen = HashSet::new();
        for _ in 0..500 {
            seen.insert(format!("{:?}", generator.plan().spec));
        }
        for op in default_operations() {
            assert!(seen.contains(&format!("{:?}", op)), "never drew {:?}", op);
        }
    }

    #[test]
    fn test_seeded_plan_reaches_direct_error_routes() {
        let mut generator =
            TrafficGenerator::new(&fast_config(1), "http://127.0.0.1:8000".into()).unwrap();
        let mut statuses = HashSet::new();
        for _ in 0..5000 {
            let planned = generator.plan();
            if let Some(code) = planned.path.strip_prefix("/api/error/") {
                assert_eq!(planned.method, reqwest::Method::GET);
                assert_eq!(planned.force_error, None);
                statuses.insert(code.to_string());
            }
        }
        for code in ["400", "404", "500", "503"] {
            assert!(statuses.contains(code), "never drew /api/error/{}", code);
        }
    }

    #[test]
    fn test_same_seed_same_plan() {
        let config = fast_config(42);
        let mut a = TrafficGenerator::new(&config, "http://x".into()).unwrap();
        let mut b = TrafficGenerator::new(&config, "http://x".into()).unwrap();
        for _ in 0..50 {
            assert_eq!(a.plan(), b.plan());
        }
    }

    #[test]
    fn test_planned_requests_are_concrete() {
        let mut generator =
            TrafficGenerator::new(&fast_config(3), "http://127.0.0.1:8000".into()).unwrap();
        for _ in 0..300 {
            let planned = generator.plan();
            assert!(!planned.path.contains(operations::ID_PLACEHOLDER));
            match planned.spec {
                OperationSpec::InjectError { status } => {
                    assert_eq!(planned.force_error, Some(status));
                    assert!(INJECTABLE_METHODS.contains(&planned.method));
                    let id: u32 = planned
                        .path
                        .strip_prefix("/api/items/")
                        .unwrap()
                        .parse()
                        .unwrap();
                    assert!((1000..=9999).contains(&id));
                }
                OperationSpec::Call { .. } => assert_eq!(planned.force_error, None),
            }
        }
    }

    #[test]
    fn test_delay_within_bounds() {
        let config = TrafficConfig {
            seed: Some(9),
            ..TrafficConfig::default()
        };
        let mut generator = TrafficGenerator::new(&config, "http://x".into()).unwrap();
        for _ in 0..200 {
            let delay = generator.next_delay();
            assert!(delay >= Duration::from_millis(500));
            assert!(delay <= Duration::from_secs(2));
        }
    }

    #[tokio::test]
    async fn test_drives_live_service_through_access_log() {
        let sink = Arc::new(MemorySink::new());
        let access_log = AccessLog::new(
            sink.clone(),
            &AccessLogConfig {
                color: ColorMode::Never,
                ..AccessLogConfig::default()
            },
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(
                listener,
                create_router(access_log).into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
        });

        let generator =
            TrafficGenerator::new(&fast_config(11), format!("http://{}", addr)).unwrap();
        let handle = generator.spawn();

        let deadline = tokio::time::Instant::now() + Duration::from_secs(15);
        // Requests are sequential: a sixth logged line means five were answered
        while sink.len() < 6 && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        let stats = handle.stop().await;
        server.abort();

        assert!(stats.issued >= 5, "stats: {:?}", stats);
        assert_eq!(stats.failed, 0);
        let lines = sink.lines();
        assert!(lines.len() >= 5);
        assert!(lines.iter().all(|l| l.contains(" 127.0.0.1 ")));
    }

    #[tokio::test]
    async fn test_survives_unreachable_target() {
        // Bind then drop so the port is known to be closed
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let generator =
            TrafficGenerator::new(&fast_config(5), format!("http://{}", addr)).unwrap();
        let handle = generator.spawn();
        tokio::time::sleep(Duration::from_millis(300)).await;

        let stats = tokio::time::timeout(Duration::from_secs(5), handle.stop())
            .await
            .unwrap();
        assert_eq!(stats.issued, 0);
        assert!(stats.failed >= 2, "stats: {:?}", stats);
    }

    #[tokio::test]
    async fn test_stop_during_warmup_is_prompt() {
        let config = TrafficConfig {
            warmup_secs: 60.0,
            ..fast_config(1)
        };
        let handle = TrafficGenerator::new(&config, "http://127.0.0.1:1".into())
            .unwrap()
            .spawn();

        let stats = tokio::time::timeout(Duration::from_secs(2), handle.stop())
            .await
            .unwrap();
        assert_eq!(stats, TrafficStats::default());
    }
}
