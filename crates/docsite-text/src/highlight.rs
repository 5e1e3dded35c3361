//! Query-term highlighting for titles and body snippets.

use regex::{Captures, Regex, RegexBuilder};

pub const MARK_OPEN: &str = "<mark>";
pub const MARK_CLOSE: &str = "</mark>";
const ELLIPSIS: &str = "...";

/// Lowercased, whitespace-separated query terms with query-syntax noise
/// removed (`+`/`-` prefixes, quotes, `field:` prefixes, boolean operators).
pub fn query_terms(query: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for raw in query.split_whitespace() {
        if matches!(raw, "AND" | "OR" | "NOT") {
            continue;
        }
        let raw = raw.rsplit(':').next().unwrap_or(raw);
        let term = raw.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
        if !term.is_empty() && !terms.contains(&term) {
            terms.push(term);
        }
    }
    terms
}

/// Wraps case-insensitive occurrences of a fixed set of terms in
/// `<mark>` tags.
#[derive(Debug, Clone)]
pub struct Highlighter {
    pattern: Option<Regex>,
}

impl Highlighter {
    pub fn new(terms: &[String]) -> Self {
        let mut terms: Vec<&str> = terms
            .iter()
            .map(String::as_str)
            .filter(|t| !t.is_empty())
            .collect();
        // Longest first so the alternation prefers "install" over "in".
        terms.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        terms.dedup();
        if terms.is_empty() {
            return Self { pattern: None };
        }
        let alternation = terms
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = RegexBuilder::new(&alternation)
            .case_insensitive(true)
            .build()
            .ok();
        Self { pattern }
    }

    /// `None` when no term occurs in `text`.
    pub fn mark(&self, text: &str) -> Option<String> {
        let pattern = self.pattern.as_ref()?;
        if !pattern.is_match(text) {
            return None;
        }
        let marked = pattern.replace_all(text, |caps: &Captures| {
            format!("{}{}{}", MARK_OPEN, &caps[0], MARK_CLOSE)
        });
        Some(marked.into_owned())
    }

    /// A window of `radius` characters either side of the first term found in
    /// `body`, with the terms marked and `...` where the window was cut.
    pub fn snippet(&self, body: &str, radius: usize) -> Option<String> {
        let found = self.pattern.as_ref()?.find(body)?;
        let start = chars_before(body, found.start(), radius);
        let end = chars_after(body, found.end(), radius);
        let window = body[start..end]
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        let mut snippet = String::with_capacity(window.len() + 32);
        if start > 0 {
            snippet.push_str(ELLIPSIS);
        }
        snippet.push_str(&self.mark(&window).unwrap_or(window));
        if end < body.len() {
            snippet.push_str(ELLIPSIS);
        }
        Some(snippet)
    }
}

/// Byte offset `n` characters before `from`, clamped to the start.
fn chars_before(text: &str, from: usize, n: usize) -> usize {
    text[..from]
        .char_indices()
        .rev()
        .take(n)
        .last()
        .map_or(from, |(i, _)| i)
}

/// Byte offset `n` characters after `from`, clamped to the end.
fn chars_after(text: &str, from: usize, n: usize) -> usize {
    text[from..]
        .char_indices()
        .nth(n)
        .map_or(text.len(), |(i, _)| from + i)
}
