// src/metrics.rs
//! Prometheus exposition: recorder install plus the `/metrics` route the
//! main router merges in.

use axum::{routing::get, Router};
use metrics::{describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    handle: PrometheusHandle,
}

impl Metrics {
    /// Install the process-wide recorder and publish the static trend-cache
    /// TTL gauge. Runs once per process; `app()` guards it with a OnceCell.
    pub fn init(cache_ttl_ms: u64) -> Self {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .expect("prometheus: install recorder");

        describe_gauge!(
            "trends_cache_ttl_ms",
            "Configured trend-cache TTL in milliseconds."
        );
        gauge!("trends_cache_ttl_ms").set(cache_ttl_ms as f64);

        Self { handle }
    }

    /// Router exposing `/metrics` in Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
