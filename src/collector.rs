// src/collector.rs
//! Trend collection orchestration: cache, credential gate, one grounded call
//! per fresh fetch, normalization, placeholder degradation.
//!
//! The endpoint contract is graceful degradation: whatever happens upstream,
//! the caller gets a 200 with a batch (fresh, recycled, placeholder or
//! empty) and flags describing which one it got.

use chrono::{Local, Timelike, Utc};
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use rand::seq::IndexedRandom;

use crate::ai::{prompt_id, SearchSpec};
use crate::api::AppState;
use crate::mock::mock_trends;
use crate::normalize::normalize_batch;
use crate::prompt::{build_search_plan, ECHO_ACCOUNTS};
use crate::types::{SearchParamsEcho, TrendsResponse};

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("trends_requests_total", "Trend fetches requested.");
        describe_counter!("trends_cache_hits_total", "Batches served from the cache slot.");
        describe_counter!("trends_mock_total", "Placeholder batches served for missing credentials.");
        describe_counter!("trends_fallback_total", "Placeholder batches served after upstream errors.");
        describe_counter!("trends_kept_total", "Candidates surfaced after normalization.");
        describe_counter!(
            "trends_dropped_total",
            "Candidates dropped for lacking a resolvable source URL."
        );
        describe_counter!("trends_deduped_total", "Candidates collapsed as near-duplicates.");
        describe_counter!(
            "trends_parse_failures_total",
            "Upstream payloads that defeated both JSON parses."
        );
    });
}

/// Accounts echoed alongside non-fresh batches, where no real selection ran.
fn sample_account_echo(state: &AppState) -> Vec<String> {
    let mut rng = rand::rng();
    state
        .search_cfg
        .account_bundles
        .choose(&mut rng)
        .map(|bundle| bundle.iter().take(ECHO_ACCOUNTS).cloned().collect())
        .unwrap_or_default()
}

fn echo(accounts: Vec<String>) -> SearchParamsEcho {
    SearchParamsEcho {
        accounts,
        timestamp: Utc::now().to_rfc3339(),
    }
}

/// Serve one `GET /trends` invocation. Never returns an error.
pub async fn fetch_trends(state: &AppState) -> TrendsResponse {
    ensure_metrics_described();
    counter!("trends_requests_total").increment(1);

    if let Some(batch) = state.cache.recycle() {
        counter!("trends_cache_hits_total").increment(1);
        tracing::debug!(count = batch.len(), "serving recycled batch");
        return TrendsResponse::cached(batch, echo(sample_account_echo(state)));
    }

    let Some(search) = &state.search else {
        counter!("trends_mock_total").increment(1);
        tracing::info!("no search credential configured, serving placeholder batch");
        return TrendsResponse::mock(mock_trends(Utc::now()), echo(sample_account_echo(state)));
    };

    let plan = build_search_plan(&state.search_cfg, Local::now().hour());
    let spec = SearchSpec {
        accounts: plan.accounts.clone(),
        country: state.search_cfg.country.clone(),
        max_results: state.search_cfg.max_search_results,
    };
    tracing::info!(
        provider = search.name(),
        prompt_id = %prompt_id(&plan.prompt),
        accounts = plan.accounts.len(),
        "issuing grounded search"
    );

    match search.search(&plan.prompt, &spec).await {
        Ok(outcome) => {
            let batch = normalize_batch(&outcome.text, &outcome.citations, Utc::now());
            counter!("trends_kept_total").increment(batch.trends.len() as u64);
            counter!("trends_dropped_total").increment(batch.dropped_no_source as u64);
            counter!("trends_deduped_total").increment(batch.deduped as u64);
            if batch.parse_failed {
                counter!("trends_parse_failures_total").increment(1);
                tracing::warn!(prompt_id = %prompt_id(&plan.prompt), "upstream payload unparsable, batch empty");
            }
            tracing::info!(
                parsed = batch.parsed,
                kept = batch.trends.len(),
                dropped = batch.dropped_no_source,
                deduped = batch.deduped,
                "normalized trend batch"
            );

            state.cache.store(batch.trends.clone());

            let mut accounts = plan.accounts;
            accounts.truncate(ECHO_ACCOUNTS);
            TrendsResponse::fresh(batch.trends, outcome.citations, echo(accounts))
        }
        Err(e) => {
            counter!("trends_fallback_total").increment(1);
            tracing::warn!(error = ?e, provider = search.name(), "grounded search failed, serving placeholder batch");
            TrendsResponse::fallback(mock_trends(Utc::now()), echo(sample_account_echo(state)))
        }
    }
}
