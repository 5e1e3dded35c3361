//! Caller-facing documentation operations: the ordered tree, ranked search
//! and single-document lookup, plus polling-based index refresh.

pub mod watcher;

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error};

use docsite_core::config::{DocsConfig, SearchConfig};
use docsite_core::error::{Error, Result};
use docsite_core::order::OrderTables;
use docsite_core::parser::parse_file;
use docsite_core::sources::SourceTree;
use docsite_core::traits::DocumentSearch;
use docsite_core::tree::build_tree;
use docsite_core::types::{
    DocMeta, DocTreeNode, Heading, ParsedDocument, RebuildOutcome, SearchResult,
};
use docsite_text::SearchIndex;

pub use watcher::{fingerprint, StalenessWatcher, WatchOutcome};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentResponse {
    pub meta: DocMeta,
    pub html: String,
    pub headings: Vec<Heading>,
    pub excerpt: String,
}

impl From<ParsedDocument> for DocumentResponse {
    fn from(doc: ParsedDocument) -> Self {
        Self {
            meta: doc.meta,
            html: doc.html,
            headings: doc.headings,
            excerpt: doc.excerpt,
        }
    }
}

pub struct DocsService<S>
where
    S: DocumentSearch,
{
    sources: SourceTree,
    order: OrderTables,
    settings: SearchConfig,
    engine: Arc<S>,
}

pub type DocsSite = DocsService<SearchIndex>;

impl<S> DocsService<S>
where
    S: DocumentSearch,
{
    pub fn new(
        sources: SourceTree,
        order: OrderTables,
        settings: SearchConfig,
        engine: Arc<S>,
    ) -> Self {
        Self {
            sources,
            order,
            settings,
            engine,
        }
    }

    pub fn from_config(config: &DocsConfig, base: &Path, engine: Arc<S>) -> Self {
        Self::new(
            config.source_tree(base),
            config.order.clone(),
            config.search.clone(),
            engine,
        )
    }

    pub fn sources(&self) -> &SourceTree {
        &self.sources
    }

    pub fn engine(&self) -> &Arc<S> {
        &self.engine
    }

    /// Rebuild the search index from the current sources. A failure leaves
    /// the previously published index serving queries.
    pub fn refresh(&self) -> Result<RebuildOutcome> {
        self.engine.rebuild(&self.sources).map_err(|err| {
            error!(
                root = %self.sources.root().display(),
                error = %err,
                "search index rebuild failed"
            );
            err
        })
    }

    pub fn tree(&self) -> Result<Vec<DocTreeNode>> {
        build_tree(&self.sources, &self.order).map_err(|err| {
            error!(
                root = %self.sources.root().display(),
                error = %err,
                "documentation tree build failed"
            );
            err
        })
    }

    /// `query` must be present and non-blank; `limit` defaults to the
    /// configured default and is capped at the configured maximum.
    pub fn search(&self, query: Option<&str>, limit: Option<usize>) -> Result<SearchResponse> {
        let query = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| Error::InvalidInput("search query `q` is required".to_string()))?;
        let limit = limit
            .unwrap_or(self.settings.default_limit)
            .min(self.settings.max_limit);
        let results = self.engine.search(query, limit);
        debug!(query, limit, hits = results.len(), "search served");
        Ok(SearchResponse {
            results,
            query: query.to_string(),
        })
    }

    /// Look up a document by tree path. A bare category path yields that
    /// category's index document.
    pub fn document(&self, path: &str) -> Result<DocumentResponse> {
        let file = self.sources.resolve(path)?;
        Ok(parse_file(&file)?.into())
    }
}

impl DocsService<SearchIndex> {
    /// A service whose index has not been loaded yet. Tree and document
    /// lookups read the sources directly and work without it.
    pub fn unindexed(config: &DocsConfig, base: &Path) -> Result<Self> {
        let engine = Arc::new(SearchIndex::new(config.search.clone())?);
        Ok(Self::from_config(config, base, engine))
    }

    /// Build a service over a fresh tantivy index and load it once.
    pub fn open(config: &DocsConfig, base: &Path) -> Result<Self> {
        let service = Self::unindexed(config, base)?;
        service.refresh()?;
        Ok(service)
    }
}
