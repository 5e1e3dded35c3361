use std::sync::Arc;

use crate::error::Result;
use crate::sources::SourceTree;
use crate::types::{ParsedDocument, RebuildOutcome, SearchResult};

/// A full-text engine over a documentation tree.
///
/// `rebuild` replaces the whole index; `search` and `document` only ever
/// read the most recently published one.
pub trait DocumentSearch: Send + Sync {
    fn rebuild(&self, sources: &SourceTree) -> Result<RebuildOutcome>;
    fn search(&self, query: &str, limit: usize) -> Vec<SearchResult>;
    fn document(&self, id: &str) -> Option<Arc<ParsedDocument>>;
}
