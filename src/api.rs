// src/api.rs
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use futures::StreamExt;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use tower_http::cors::CorsLayer;

use crate::ai::{build_article_writer, build_search_client, DynArticleWriter, DynGroundedSearch};
use crate::article::{build_draft_prompt, ArticleRequest};
use crate::cache::TrendCache;
use crate::collector;
use crate::config::SearchConfig;

#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<TrendCache>,
    pub search: Option<DynGroundedSearch>,
    pub writer: DynArticleWriter,
    pub search_cfg: Arc<SearchConfig>,
}

impl AppState {
    /// Wire everything from the environment: cache TTL, search vocabulary,
    /// and whichever providers the configured credentials allow.
    pub fn from_env() -> Self {
        Self {
            cache: Arc::new(TrendCache::from_env()),
            search: build_search_client(),
            writer: build_article_writer(),
            search_cfg: Arc::new(SearchConfig::load()),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/trends", get(trends))
        .route("/generate", post(generate))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Collector endpoint: always 200, flags tell the caller what it got.
async fn trends(State(state): State<AppState>) -> impl IntoResponse {
    Json(collector::fetch_trends(&state).await)
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("article_requests_total", "Draft generations requested.");
        describe_counter!("article_rejected_total", "Draft requests rejected before any upstream call.");
        describe_counter!("article_streams_total", "Draft streams opened to the writer model.");
        describe_counter!(
            "article_stream_failures_total",
            "Draft generations that failed before streaming began."
        );
    });
}

/// Streamer endpoint: schema-validate, then relay writer tokens verbatim.
/// Failures before the first token are structured 4xx/5xx; after that the
/// stream just ends (the client cannot tell truncation from completion).
async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<ArticleRequest>, JsonRejection>,
) -> Response {
    ensure_metrics_described();
    counter!("article_requests_total").increment(1);

    let Json(request) = match payload {
        Ok(p) => p,
        Err(rejection) => {
            counter!("article_rejected_total").increment(1);
            tracing::debug!(error = %rejection, "malformed generate payload");
            return error_response(StatusCode::BAD_REQUEST, "invalid payload");
        }
    };
    if let Err(reason) = request.validate() {
        counter!("article_rejected_total").increment(1);
        return error_response(StatusCode::BAD_REQUEST, &reason);
    }

    let prompt = build_draft_prompt(&request.trends);
    match state.writer.stream_article(&prompt.system, &prompt.user).await {
        Ok(tokens) => {
            counter!("article_streams_total").increment(1);
            let body = Body::from_stream(
                tokens.map(|tok| Ok::<_, std::convert::Infallible>(Bytes::from(tok))),
            );
            (
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                body,
            )
                .into_response()
        }
        Err(e) => {
            counter!("article_stream_failures_total").increment(1);
            tracing::error!(error = ?e, provider = state.writer.name(), "draft generation failed pre-flight");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "generation failed")
        }
    }
}
