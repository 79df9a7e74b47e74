// src/ai/writer.rs
//! Token-streaming article writer. Production implementation decodes the
//! OpenAI chat-completions SSE stream; the relay upstairs forwards tokens
//! without buffering, so a transport failure mid-stream simply ends the
//! stream early (logged here, invisible to the wire).

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::json;

// ------------------------------------------------------------
// Public surface
// ------------------------------------------------------------

/// Plain content tokens, ready to relay. The stream ends on completion or on
/// the first transport error; there is no error item.
pub type TokenStream = Pin<Box<dyn Stream<Item = String> + Send>>;

#[async_trait]
pub trait ArticleWriter: Send + Sync {
    /// Open a streaming generation. Errors here are pre-flight (surfaced as
    /// HTTP 500); after the stream starts no failure is recoverable.
    async fn stream_article(&self, system: &str, prompt: &str) -> Result<TokenStream>;
    fn name(&self) -> &'static str;
}

pub type DynArticleWriter = Arc<dyn ArticleWriter>;

/// Factory: deterministic mock under `AI_TEST_MODE=mock`, OpenAI otherwise.
/// A missing credential surfaces on the first call, not at construction.
pub fn build_article_writer() -> DynArticleWriter {
    if super::mock_mode() {
        return Arc::new(MockWriter);
    }
    Arc::new(OpenAiWriter::new(None))
}

// ------------------------------------------------------------
// OpenAI provider
// ------------------------------------------------------------

/// Streaming chat completions. Requires `OPENAI_API_KEY`; model overridable
/// via `OPENAI_MODEL`.
pub struct OpenAiWriter {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiWriter {
    pub fn new(model_override: Option<&str>) -> Self {
        let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
        let http = reqwest::Client::builder()
            .user_agent("trend-radar/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(120))
            .build()
            .expect("reqwest client");
        let model = model_override
            .map(str::to_string)
            .or_else(|| std::env::var("OPENAI_MODEL").ok())
            .unwrap_or_else(|| "gpt-4.1".to_string());
        Self {
            http,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl ArticleWriter for OpenAiWriter {
    async fn stream_article(&self, system: &str, prompt: &str) -> Result<TokenStream> {
        if self.api_key.is_empty() {
            anyhow::bail!("OPENAI_API_KEY is not set");
        }

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": prompt },
            ],
            "stream": true,
        });

        let resp = self
            .http
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let detail = resp.text().await.unwrap_or_default();
            anyhow::bail!("article generation error {status}: {detail}");
        }

        let decoder = SseDecoder::new(resp.bytes_stream().boxed());
        let stream = futures::stream::unfold(decoder, |mut d| async move {
            d.next_token().await.map(|tok| (tok, d))
        });
        Ok(Box::pin(stream))
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

// ------------------------------------------------------------
// SSE decoding
// ------------------------------------------------------------

/// Incremental decoder over the raw byte stream. Bytes are buffered until a
/// full line is available; `data:` payloads yield content tokens until the
/// `[DONE]` sentinel or a transport error ends the stream.
struct SseDecoder {
    body: Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>,
    buf: Vec<u8>,
    queue: VecDeque<String>,
    done: bool,
}

impl SseDecoder {
    fn new(body: Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>) -> Self {
        Self {
            body,
            buf: Vec::new(),
            queue: VecDeque::new(),
            done: false,
        }
    }

    async fn next_token(&mut self) -> Option<String> {
        loop {
            if let Some(tok) = self.queue.pop_front() {
                return Some(tok);
            }
            if self.done {
                return None;
            }
            match self.body.next().await {
                Some(Ok(chunk)) => self.push_chunk(&chunk),
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "article stream aborted mid-flight");
                    return None;
                }
                None => return None,
            }
        }
    }

    /// Splitting on `\n` is byte-safe: 0x0A never appears inside a UTF-8
    /// multi-byte sequence, so only complete lines get decoded.
    fn push_chunk(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            match decode_sse_line(line.trim()) {
                SseFrame::Done => {
                    self.done = true;
                    return;
                }
                SseFrame::Token(tok) => self.queue.push_back(tok),
                SseFrame::Skip => {}
            }
        }
    }
}

enum SseFrame {
    Token(String),
    Done,
    Skip,
}

fn decode_sse_line(line: &str) -> SseFrame {
    #[derive(Deserialize)]
    struct Chunk {
        choices: Vec<StreamChoice>,
    }
    #[derive(Deserialize)]
    struct StreamChoice {
        delta: Delta,
    }
    #[derive(Deserialize)]
    struct Delta {
        #[serde(default)]
        content: Option<String>,
    }

    let Some(payload) = line.strip_prefix("data:") else {
        return SseFrame::Skip;
    };
    let payload = payload.trim();
    if payload == "[DONE]" {
        return SseFrame::Done;
    }
    match serde_json::from_str::<Chunk>(payload) {
        Ok(chunk) => chunk
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.delta.content)
            .filter(|s| !s.is_empty())
            .map(SseFrame::Token)
            .unwrap_or(SseFrame::Skip),
        Err(_) => SseFrame::Skip,
    }
}

// ------------------------------------------------------------
// Mock provider
// ------------------------------------------------------------

/// Streams a fixed markdown-flavored draft in small chunks, so consumers
/// exercise incremental accumulation and markdown stripping.
pub struct MockWriter;

const MOCK_ARTICLE: &str = "## El dólar vuelve a marcar la agenda\n\n\
**Copete:** El mercado cambiario concentró la atención de la rueda, \
con el paralelo en máximos y los bonos en verde.\n\n\
### Qué pasó\n\
- El blue tocó un nuevo récord intradiario\n\
- El BCRA convalidó una suba de tasas\n\n\
El equipo económico siguió de cerca la operatoria [fuente: https://ambito.com]. \
Analistas consultados hablan de *cobertura estacional* y descartan un salto discreto.\n\n\
### Qué mirar\n\
Los vencimientos de la semana próxima y la licitación del Tesoro definirán el margen \
de maniobra. Cierre con sesgo comprador.\n";

#[async_trait]
impl ArticleWriter for MockWriter {
    async fn stream_article(&self, _system: &str, _prompt: &str) -> Result<TokenStream> {
        // ~24-byte chunks, split on char boundaries.
        let mut chunks: Vec<String> = Vec::new();
        let mut current = String::new();
        for ch in MOCK_ARTICLE.chars() {
            current.push(ch);
            if current.len() >= 24 {
                chunks.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            chunks.push(current);
        }
        Ok(Box::pin(futures::stream::iter(chunks)))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
