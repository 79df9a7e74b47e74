// src/normalize.rs
//! Best-effort recovery of the model's trend JSON into `NormalizedTrend`s.
//!
//! The upstream model is asked for strict JSON under a `trends` key but is
//! not trusted to deliver it: the parse falls back to the outermost `{...}`
//! substring, every field is coerced, and the worst case is an empty batch.
//! No error from this stage ever reaches a caller.

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;
use serde_json::Value;
use strsim::normalized_levenshtein;

use crate::types::{Citation, NormalizedTrend};

/// Titles are capped hard even though the prompt asks for 90 chars.
pub const TITLE_MAX_CHARS: usize = 120;

/// Two titles at or above this similarity are considered the same trend.
pub const NEAR_DUPLICATE_SIMILARITY: f64 = 0.90;

pub(crate) fn url_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?i)^https?://").unwrap())
}

/// Whether `s` looks like an absolute http(s) URL.
pub fn is_http_url(s: &str) -> bool {
    url_re().is_match(s)
}

/// Outcome of one normalization pass, with the counts the collector reports.
#[derive(Debug, Default)]
pub struct NormalizedBatch {
    pub trends: Vec<NormalizedTrend>,
    /// Raw candidates found under `trends` before any filtering.
    pub parsed: usize,
    /// Candidates dropped for lacking a resolvable source URL.
    pub dropped_no_source: usize,
    /// Candidates collapsed as near-duplicate titles.
    pub deduped: usize,
    /// True when neither the strict nor the substring parse succeeded.
    pub parse_failed: bool,
}

/// Strict parse first, then the substring between the first `{` and the last `}`.
fn parse_loose(text: &str) -> Option<Value> {
    if let Ok(v) = serde_json::from_str::<Value>(text) {
        return Some(v);
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Value>(&text[start..=end]).ok()
}

/// Stringify a scalar the way loose clients do: numbers and bools become
/// their text form, null/absent becomes empty.
fn coerce_string(v: Option<&Value>) -> String {
    match v {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// HTML-entity decode and collapse whitespace; model snippets often carry
/// `&amp;` and stray newlines from scraped pages.
fn clean_text(s: &str) -> String {
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    let out = html_escape::decode_html_entities(s).to_string();
    re_ws.replace_all(&out, " ").trim().to_string()
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Accept an integer or an integer-looking string as a citation index.
fn coerce_index(v: Option<&Value>) -> Option<i64> {
    match v {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Resolve a candidate's source: 1-based `sourceIndex` into the citation
/// list wins; a raw `sourceUrl` is only honored when it is an http(s) URL.
fn resolve_source(candidate: &Value, citations: &[Citation]) -> Option<String> {
    if let Some(ix) = coerce_index(candidate.get("sourceIndex")) {
        if ix >= 1 && (ix as usize) <= citations.len() {
            let cite = &citations[ix as usize - 1];
            if cite.kind == "url" {
                if let Some(url) = &cite.url {
                    return Some(url.clone());
                }
            }
        }
    }
    let raw = coerce_string(candidate.get("sourceUrl"));
    if !raw.is_empty() && is_http_url(&raw) {
        return Some(raw);
    }
    None
}

fn coerce_score(v: Option<&Value>) -> i32 {
    match v.and_then(Value::as_f64) {
        Some(n) if n.is_finite() => n.round().clamp(0.0, 100.0) as i32,
        _ => rand::rng().random_range(50..80),
    }
}

fn coerce_tags(v: Option<&Value>) -> Vec<String> {
    match v {
        Some(Value::Array(items)) => items.iter().map(|x| coerce_string(Some(x))).collect(),
        _ => Vec::new(),
    }
}

/// Keep the first occurrence of each near-identical title.
fn collapse_near_duplicates(items: Vec<NormalizedTrend>) -> (Vec<NormalizedTrend>, usize) {
    let mut kept: Vec<NormalizedTrend> = Vec::with_capacity(items.len());
    let mut dropped = 0usize;
    for it in items {
        let lower = it.title.to_lowercase();
        let dup = kept
            .iter()
            .any(|k| normalized_levenshtein(&k.title.to_lowercase(), &lower) >= NEAR_DUPLICATE_SIMILARITY);
        if dup {
            dropped += 1;
        } else {
            kept.push(it);
        }
    }
    (kept, dropped)
}

/// Turn raw model text plus its citation list into a surfaced batch.
///
/// Ids are `{batch_millis}-{position}` where position is the candidate's
/// index in the raw list, so an id still names the model's ordering even
/// after filtering.
pub fn normalize_batch(raw_text: &str, citations: &[Citation], now: DateTime<Utc>) -> NormalizedBatch {
    let parsed = parse_loose(raw_text);
    let parse_failed = parsed.is_none();

    let candidates: Vec<Value> = parsed
        .as_ref()
        .and_then(|v| v.get("trends"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let batch_millis = now.timestamp_millis();
    let stamp = now.to_rfc3339();
    let total = candidates.len();

    let mut kept = Vec::with_capacity(total);
    let mut dropped_no_source = 0usize;
    for (idx, candidate) in candidates.iter().enumerate() {
        let source_url = match resolve_source(candidate, citations) {
            Some(url) => url,
            None => {
                dropped_no_source += 1;
                continue;
            }
        };
        kept.push(NormalizedTrend {
            id: format!("{batch_millis}-{idx}"),
            title: truncate_chars(&clean_text(&coerce_string(candidate.get("title"))), TITLE_MAX_CHARS),
            summary: clean_text(&coerce_string(candidate.get("summary"))),
            score: coerce_score(candidate.get("score")),
            tags: coerce_tags(candidate.get("tags")),
            source_url: Some(source_url),
            timestamp: stamp.clone(),
        });
    }

    let (mut trends, deduped) = collapse_near_duplicates(kept);
    trends.shuffle(&mut rand::rng());

    NormalizedBatch {
        trends,
        parsed: total,
        dropped_no_source,
        deduped,
        parse_failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_decodes_entities_and_collapses_ws() {
        assert_eq!(clean_text("Soja&nbsp;&amp;   trigo\n al alza "), "Soja & trigo al alza");
    }

    #[test]
    fn coerce_string_stringifies_scalars() {
        assert_eq!(coerce_string(Some(&serde_json::json!(42))), "42");
        assert_eq!(coerce_string(Some(&serde_json::json!(true))), "true");
        assert_eq!(coerce_string(Some(&Value::Null)), "");
        assert_eq!(coerce_string(None), "");
    }

    #[test]
    fn parse_loose_recovers_fenced_json() {
        let text = "Claro, aquí están:\n```json\n{\"trends\": []}\n```";
        let v = parse_loose(text).expect("substring parse");
        assert!(v.get("trends").is_some());
    }

    #[test]
    fn near_duplicate_titles_collapse_to_first() {
        let mk = |title: &str| NormalizedTrend {
            id: "x".into(),
            title: title.into(),
            summary: String::new(),
            score: 50,
            tags: vec![],
            source_url: Some("https://a.example/x".into()),
            timestamp: "t".into(),
        };
        let (kept, dropped) = collapse_near_duplicates(vec![
            mk("Dólar blue sube a $1350"),
            mk("Dólar blue sube a $1355"),
            mk("Merval opera con volatilidad"),
        ]);
        assert_eq!(kept.len(), 2);
        assert_eq!(dropped, 1);
        assert_eq!(kept[0].title, "Dólar blue sube a $1350");
    }
}
