//! docsite-text
//!
//! Tantivy-based full-text index over a documentation tree: weighted
//! multi-field ranking, atomic index replacement, and highlighted snippets.

pub mod highlight;
pub mod index;
pub mod search;
pub mod tantivy_utils;

pub use highlight::{Highlighter, MARK_CLOSE, MARK_OPEN};
pub use index::SearchIndex;
