// src/types.rs
use serde::{Deserialize, Serialize};

/// A trend candidate after normalization. Everything the editor UI renders
/// comes from this shape; raw model output never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedTrend {
    /// Unique within a batch: `{batch_millis}-{position}` (mock batches use a `mock-` prefix).
    pub id: String,
    pub title: String,
    pub summary: String,
    /// 0..=100, hotter is higher.
    pub score: i32,
    pub tags: Vec<String>,
    /// Absolute http(s) URL. Fresh batches never surface an item without one;
    /// placeholder batches may omit it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// Batch-creation instant, RFC 3339.
    pub timestamp: String,
}

/// One entry of the citation list returned alongside a grounded generation.
/// Consumed by the normalizer right after the call and then discarded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Citation {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Citation {
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            kind: "url".to_string(),
            url: Some(url.into()),
        }
    }
}

/// Echo of the search configuration used for a batch, so the UI can show
/// which accounts were scanned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParamsEcho {
    pub accounts: Vec<String>,
    pub timestamp: String,
}

/// Response body of `GET /trends`. Optional flags mark recycled, placeholder
/// and degraded batches; the status code is 200 in every case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendsResponse {
    pub trends: Vec<NormalizedTrend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mock: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Citation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_params: Option<SearchParamsEcho>,
}

impl TrendsResponse {
    pub fn fresh(
        trends: Vec<NormalizedTrend>,
        sources: Vec<Citation>,
        search_params: SearchParamsEcho,
    ) -> Self {
        Self {
            trends,
            cached: None,
            mock: None,
            fallback: None,
            sources: Some(sources),
            search_params: Some(search_params),
        }
    }

    pub fn cached(trends: Vec<NormalizedTrend>, search_params: SearchParamsEcho) -> Self {
        Self {
            trends,
            cached: Some(true),
            mock: None,
            fallback: None,
            sources: None,
            search_params: Some(search_params),
        }
    }

    pub fn mock(trends: Vec<NormalizedTrend>, search_params: SearchParamsEcho) -> Self {
        Self {
            trends,
            cached: None,
            mock: Some(true),
            fallback: None,
            sources: None,
            search_params: Some(search_params),
        }
    }

    pub fn fallback(trends: Vec<NormalizedTrend>, search_params: SearchParamsEcho) -> Self {
        Self {
            trends,
            cached: None,
            mock: None,
            fallback: Some(true),
            sources: None,
            search_params: Some(search_params),
        }
    }
}
