//! Highlight metadata for rendering matched query tokens.
//!
//! Matching itself always runs over folded text; the regex here only
//! drives span-level emphasis in whatever surface renders the rows, so
//! it is built from the normalized (not folded) tokens and compiled
//! case-insensitive.

use std::ops::Range;

use regex::{escape, Regex, RegexBuilder};

use crate::fold::normalize;

#[derive(Debug, Clone)]
pub struct HighlightMeta {
    raw: String,
    has_query: bool,
    regex: Option<Regex>,
}

impl HighlightMeta {
    pub fn new(raw_query: &str) -> Self {
        let normalized = normalize(raw_query);
        let trimmed = normalized.trim();
        let tokens: Vec<String> = trimmed.split_whitespace().map(escape).collect();
        let regex = if tokens.is_empty() {
            None
        } else {
            RegexBuilder::new(&format!("({})", tokens.join("|")))
                .case_insensitive(true)
                .build()
                .ok()
        };
        Self {
            raw: raw_query.to_string(),
            has_query: !trimmed.is_empty(),
            regex,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn has_query(&self) -> bool {
        self.has_query
    }

    /// Byte ranges of token occurrences in `text`, for emphasis.
    pub fn spans(&self, text: &str) -> Vec<Range<usize>> {
        match &self.regex {
            Some(regex) => regex.find_iter(text).map(|m| m.range()).collect(),
            None => Vec::new(),
        }
    }

    /// Wraps every token occurrence with the given markers.
    pub fn emphasize(&self, text: &str, open: &str, close: &str) -> String {
        let spans = self.spans(text);
        if spans.is_empty() {
            return text.to_string();
        }
        let mut out = String::with_capacity(text.len() + spans.len() * (open.len() + close.len()));
        let mut cursor = 0;
        for span in spans {
            out.push_str(&text[cursor..span.start]);
            out.push_str(open);
            out.push_str(&text[span.clone()]);
            out.push_str(close);
            cursor = span.end;
        }
        out.push_str(&text[cursor..]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_has_no_regex() {
        let meta = HighlightMeta::new("   ");
        assert!(!meta.has_query());
        assert!(meta.spans("anything").is_empty());
    }

    #[test]
    fn tokens_match_case_insensitively() {
        let meta = HighlightMeta::new("steam");
        assert!(meta.has_query());
        assert_eq!(meta.spans("Steam Deck"), vec![0..5]);
    }

    #[test]
    fn metacharacters_are_escaped() {
        let meta = HighlightMeta::new("c++ (beta)");
        assert_eq!(meta.emphasize("c++ tools", "[", "]"), "[c++] tools");
        assert_eq!(meta.emphasize("x (beta) y", "[", "]"), "x [(beta)] y");
    }

    #[test]
    fn emphasize_wraps_every_occurrence() {
        let meta = HighlightMeta::new("git");
        assert_eq!(
            meta.emphasize("git ile gitlab", "<", ">"),
            "<git> ile <git>lab"
        );
    }
}
