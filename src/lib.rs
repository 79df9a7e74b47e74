// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod ai;
pub mod api;
pub mod article;
pub mod cache;
pub mod collector;
pub mod config;
pub mod markdown;
pub mod metrics;
pub mod mock;
pub mod normalize;
pub mod prompt;
pub mod types;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::markdown::{strip_markdown, DraftAccumulator};
pub use crate::types::{Citation, NormalizedTrend, TrendsResponse};

use axum::Router;
use once_cell::sync::OnceCell;

use crate::metrics::Metrics;

/// Build the full application router the binary serves: API routes plus the
/// Prometheus exposition endpoint. The recorder installs once per process,
/// so tests can build as many routers as they need.
pub async fn app() -> anyhow::Result<Router> {
    let state = AppState::from_env();
    let ttl_ms = state.cache.ttl_ms();

    static METRICS: OnceCell<Metrics> = OnceCell::new();
    let metrics = METRICS.get_or_init(|| Metrics::init(ttl_ms));

    Ok(api::router(state).merge(metrics.router()))
}
