// src/cache.rs
//! Single-slot TTL cache for the last normalized trend batch.
//!
//! The slot exists to keep repeat requests off the Live Search bill, not for
//! correctness: a hit hands back a reshuffled slice of the stored batch, and
//! concurrent misses may both fetch, with the last writer winning.

use std::sync::RwLock;
use std::time::{Duration, Instant};

use rand::seq::SliceRandom;

use crate::types::NormalizedTrend;

pub const ENV_TRENDS_CACHE_TTL_MS: &str = "TRENDS_CACHE_TTL_MS";
pub const DEFAULT_TRENDS_CACHE_TTL_MS: u64 = 60_000;

/// Recycled batches are a strictly smaller slice than a fresh fetch, so the
/// caller can tell a rerun from new data.
pub const CACHE_SLICE_MAX: usize = 12;

struct CacheEntry {
    trends: Vec<NormalizedTrend>,
    fetched_at: Instant,
}

pub struct TrendCache {
    slot: RwLock<Option<CacheEntry>>,
    ttl: Duration,
}

impl TrendCache {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            slot: RwLock::new(None),
            ttl,
        }
    }

    /// TTL from `TRENDS_CACHE_TTL_MS`, default 60s.
    pub fn from_env() -> Self {
        let ms = std::env::var(ENV_TRENDS_CACHE_TTL_MS)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TRENDS_CACHE_TTL_MS);
        Self::with_ttl(Duration::from_millis(ms))
    }

    pub fn ttl_ms(&self) -> u64 {
        self.ttl.as_millis() as u64
    }

    /// On a hit (non-empty entry younger than the TTL), a reshuffled clone of
    /// at most [`CACHE_SLICE_MAX`] items. Membership is stable between two
    /// reads without an intervening write; order is not.
    pub fn recycle(&self) -> Option<Vec<NormalizedTrend>> {
        let mut out = {
            let guard = self.slot.read().expect("rwlock poisoned");
            let entry = guard.as_ref()?;
            if entry.trends.is_empty() || entry.fetched_at.elapsed() >= self.ttl {
                return None;
            }
            entry.trends.clone()
        };
        out.shuffle(&mut rand::rng());
        out.truncate(CACHE_SLICE_MAX);
        Some(out)
    }

    /// Replace the slot wholesale; never merges with prior contents.
    pub fn store(&self, trends: Vec<NormalizedTrend>) {
        let mut guard = self.slot.write().expect("rwlock poisoned");
        *guard = Some(CacheEntry {
            trends,
            fetched_at: Instant::now(),
        });
    }
}
