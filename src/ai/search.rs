// src/ai/search.rs
//! Grounded search provider: one prompt + search spec in, model text plus an
//! ordered citation list out. Production implementation targets the x.ai
//! chat completions API with Live Search enabled.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::types::Citation;

// ------------------------------------------------------------
// Public surface
// ------------------------------------------------------------

/// Per-call search configuration the collector assembles.
#[derive(Debug, Clone)]
pub struct SearchSpec {
    pub accounts: Vec<String>,
    pub country: String,
    pub max_results: u32,
}

/// Model answer plus the citation list that grounds it.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub text: String,
    pub citations: Vec<Citation>,
}

#[async_trait]
pub trait GroundedSearch: Send + Sync {
    async fn search(&self, prompt: &str, spec: &SearchSpec) -> Result<SearchOutcome>;
    /// Provider name for diagnostics.
    fn name(&self) -> &'static str;
}

pub type DynGroundedSearch = Arc<dyn GroundedSearch>;

/// Factory: mock in `AI_TEST_MODE=mock`, the real provider when a credential
/// is configured, `None` otherwise (the collector serves placeholders then).
pub fn build_search_client() -> Option<DynGroundedSearch> {
    if super::mock_mode() {
        return Some(Arc::new(MockSearch));
    }
    match std::env::var("XAI_API_KEY") {
        Ok(key) if !key.trim().is_empty() => Some(Arc::new(XaiSearch::new(None))),
        _ => None,
    }
}

// ------------------------------------------------------------
// x.ai provider
// ------------------------------------------------------------

/// Live Search call against x.ai chat completions. Requires `XAI_API_KEY`;
/// model overridable via `XAI_MODEL`.
pub struct XaiSearch {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl XaiSearch {
    pub fn new(model_override: Option<&str>) -> Self {
        let api_key = std::env::var("XAI_API_KEY").unwrap_or_default();
        let http = reqwest::Client::builder()
            .user_agent("trend-radar/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(45))
            .build()
            .expect("reqwest client");
        let model = model_override
            .map(str::to_string)
            .or_else(|| std::env::var("XAI_MODEL").ok())
            .unwrap_or_else(|| "grok-3-latest".to_string());
        Self {
            http,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl GroundedSearch for XaiSearch {
    async fn search(&self, prompt: &str, spec: &SearchSpec) -> Result<SearchOutcome> {
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
            #[serde(default)]
            citations: Vec<String>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: String,
        }

        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "search_parameters": {
                "mode": "on",
                "return_citations": true,
                "max_search_results": spec.max_results,
                "sources": [
                    { "type": "x", "x_handles": spec.accounts },
                    { "type": "news", "country": spec.country, "safe_search": true },
                ],
            },
        });

        let resp = self
            .http
            .post("https://api.x.ai/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let detail = resp.text().await.unwrap_or_default();
            anyhow::bail!("live search error {status}: {detail}");
        }

        let parsed: Resp = resp.json().await?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();
        let citations = parsed.citations.into_iter().map(Citation::url).collect();
        Ok(SearchOutcome { text, citations })
    }

    fn name(&self) -> &'static str {
        "xai"
    }
}

// ------------------------------------------------------------
// Mock provider
// ------------------------------------------------------------

/// Deterministic fixture exercising the whole normalization path: the text
/// carries a conversational preamble (so the substring parse runs) and the
/// batch covers index resolution, raw-URL fallback and droppable items.
pub struct MockSearch;

pub const MOCK_SEARCH_CITATIONS: &[&str] = &[
    "https://x.com/BCRAOFICIAL/status/1001",
    "https://ambito.com/dolar-blue-hoy",
    "https://cronista.com/merval-adrs",
    "https://infobae.com/campo-soja",
    "https://lanacion.com.ar/bonos-al30",
];

const MOCK_SEARCH_TEXT: &str = r#"Aquí están las tendencias encontradas:
{"trends": [
  {"title": "Dólar blue roza los $1400 y el BCRA interviene", "summary": "El paralelo marcó un nuevo récord intradiario.", "score": 92, "tags": ["dolar", "bcra"], "sourceIndex": 1},
  {"title": "El Merval sube 4% impulsado por bancos y ADRs", "summary": "Galicia y Macro lideran el rally.", "score": 81, "tags": ["merval", "acciones"], "sourceIndex": 3},
  {"title": "La soja supera los US$380 en Chicago", "summary": "El agro proyecta mayor liquidación.", "score": 74, "tags": ["soja", "campo"], "sourceIndex": 4},
  {"title": "Bonos en dólares extienden la racha alcista", "summary": "El AL30 acumula cinco ruedas en verde.", "score": 69, "tags": ["bonos"], "sourceIndex": 5},
  {"title": "Rumor: nuevo esquema cambiario en estudio", "summary": "Versiones cruzadas en el equipo económico.", "score": 65, "tags": ["cepo"], "sourceUrl": "https://x.com/Economia_Ar/status/2002"},
  {"title": "Plazo fijo: bancos ajustan tasas tras la licitación", "summary": "El rendimiento mensual vuelve a moverse.", "score": 58, "tags": ["tasas"], "sourceIndex": 0},
  {"title": "Cripto: volumen récord en stablecoins", "summary": "USDT concentra la demanda minorista.", "score": 55, "tags": ["cripto"], "sourceIndex": 99}
]}"#;

#[async_trait]
impl GroundedSearch for MockSearch {
    async fn search(&self, _prompt: &str, _spec: &SearchSpec) -> Result<SearchOutcome> {
        Ok(SearchOutcome {
            text: MOCK_SEARCH_TEXT.to_string(),
            citations: MOCK_SEARCH_CITATIONS
                .iter()
                .map(|u| Citation::url(*u))
                .collect(),
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_batch;

    #[tokio::test]
    async fn mock_fixture_survives_normalization() {
        let spec = SearchSpec {
            accounts: vec![],
            country: "AR".into(),
            max_results: 10,
        };
        let out = MockSearch.search("", &spec).await.expect("mock search");
        let batch = normalize_batch(&out.text, &out.citations, chrono::Utc::now());
        // 7 candidates: 5 resolve (4 by index, 1 by raw URL), 2 drop
        // (index 0 and index 99 are out of bounds with no URL fallback).
        assert_eq!(batch.parsed, 7);
        assert_eq!(batch.trends.len(), 5);
        assert_eq!(batch.dropped_no_source, 2);
        assert!(!batch.parse_failed);
    }
}
