// src/markdown.rs
//! Markdown removal for generated drafts.
//!
//! The streamer relays model tokens untouched; consumers that want plain
//! copy-ready text (the editor UI, the demo bin) strip formatting on their
//! side. Rules cover what the writer model actually emits: fenced code,
//! headings, list markers, bold/italic, inline code, links.

use once_cell::sync::OnceCell;
use regex::Regex;

fn re(cell: &'static OnceCell<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).unwrap())
}

/// Strip markdown markup, keeping the visible text. Links become
/// `label (url)` so sources survive the conversion.
pub fn strip_markdown(input: &str) -> String {
    static RE_FENCE: OnceCell<Regex> = OnceCell::new();
    static RE_HEADING: OnceCell<Regex> = OnceCell::new();
    static RE_LIST: OnceCell<Regex> = OnceCell::new();
    static RE_BOLD: OnceCell<Regex> = OnceCell::new();
    static RE_ITALIC: OnceCell<Regex> = OnceCell::new();
    static RE_CODE: OnceCell<Regex> = OnceCell::new();
    static RE_LINK: OnceCell<Regex> = OnceCell::new();

    let mut text = re(&RE_FENCE, r"(?s)```.*?```").replace_all(input, "").to_string();
    text = re(&RE_HEADING, r"(?m)^#{1,6}\s+").replace_all(&text, "").to_string();
    text = re(&RE_LIST, r"(?m)^[-*+]\s+").replace_all(&text, "").to_string();
    text = re(&RE_BOLD, r"\*\*(.*?)\*\*").replace_all(&text, "$1").to_string();
    text = re(&RE_ITALIC, r"\*(.*?)\*").replace_all(&text, "$1").to_string();
    text = re(&RE_CODE, r"`([^`]*)`").replace_all(&text, "$1").to_string();
    text = re(&RE_LINK, r"\[(.*?)\]\((.*?)\)")
        .replace_all(&text, "$1 ($2)")
        .to_string();
    text
}

/// Accumulates streamed tokens and exposes the scrubbed text so far.
/// Stripping runs over the whole buffer because markers (a fence, a bold
/// span) routinely straddle token boundaries.
#[derive(Debug, Default)]
pub struct DraftAccumulator {
    raw: String,
}

impl DraftAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: &str) {
        self.raw.push_str(token);
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn clean(&self) -> String {
        strip_markdown(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_headings_lists_and_emphasis() {
        let input = "## Título\n\n- primer punto\n* segundo punto\n\n**fuerte** y *suave* y `dato`";
        let out = strip_markdown(input);
        assert_eq!(out, "Título\n\nprimer punto\nsegundo punto\n\nfuerte y suave y dato");
    }

    #[test]
    fn links_keep_label_and_url() {
        let out = strip_markdown("ver [BCRA](https://bcra.gob.ar) hoy");
        assert_eq!(out, "ver BCRA (https://bcra.gob.ar) hoy");
    }

    #[test]
    fn fenced_blocks_are_dropped_entirely() {
        let out = strip_markdown("antes\n```json\n{\"a\":1}\n```\ndespués");
        assert_eq!(out, "antes\n\ndespués");
    }

    #[test]
    fn accumulator_handles_markers_split_across_tokens() {
        let mut acc = DraftAccumulator::new();
        for tok in ["## Tít", "ulo\n**ne", "gri", "ta** fin"] {
            acc.push(tok);
        }
        assert_eq!(acc.clean(), "Título\nnegrita fin");
    }
}
