// src/ai/mod.rs
//! Provider seam for the two hosted models this service consumes: a grounded
//! text generator that returns citations (trend collection) and a token
//! streamer (draft generation). Anything satisfying the two traits is
//! substitutable; `AI_TEST_MODE=mock` swaps in deterministic in-process
//! implementations for tests and local runs.

pub mod search;
pub mod writer;

pub use search::{build_search_client, DynGroundedSearch, GroundedSearch, SearchOutcome, SearchSpec};
pub use writer::{build_article_writer, ArticleWriter, DynArticleWriter, TokenStream};

/// Shared env toggle, same convention as the rest of the AI plumbing.
pub(crate) fn mock_mode() -> bool {
    std::env::var("AI_TEST_MODE").map(|v| v == "mock").unwrap_or(false)
}

/// Short stable id for logging a prompt without logging the prompt.
pub(crate) fn prompt_id(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::prompt_id;

    #[test]
    fn prompt_id_is_short_and_stable() {
        let a = prompt_id("hola");
        let b = prompt_id("hola");
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
        assert_ne!(prompt_id("chau"), a);
    }
}
