use std::sync::Arc;

use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::Value;
use tantivy::TantivyDocument;
use tracing::{debug, error};

use docsite_core::config::SearchConfig;
use docsite_core::error::{Error, Result};
use docsite_core::sources::SourceTree;
use docsite_core::traits::DocumentSearch;
use docsite_core::types::{Highlights, ParsedDocument, RebuildOutcome, SearchResult};

use crate::highlight::{query_terms, Highlighter};
use crate::index::{engine_error, IndexSnapshot, SearchIndex};

impl SearchIndex {
    /// Ranked results for `query`, best first. Invalid query syntax and
    /// engine failures yield an empty list.
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        match self.try_search(query, limit) {
            Ok(results) => results,
            Err(err) => {
                debug!(query, error = %err, "search failed, returning no results");
                Vec::new()
            }
        }
    }

    /// Like `search` but reports why a query produced nothing.
    pub fn try_search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let query = query.trim();
        let limit = limit.min(self.settings.max_limit);
        if query.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        self.snapshot().execute(query, limit, &self.settings)
    }
}

impl IndexSnapshot {
    fn execute(
        &self,
        query_text: &str,
        limit: usize,
        settings: &SearchConfig,
    ) -> Result<Vec<SearchResult>> {
        let fields = self.fields;
        let boosts = settings.boosts;
        let mut query_parser = QueryParser::for_index(&self.index, fields.default_fields());
        query_parser.set_field_boost(fields.title, boosts.title);
        query_parser.set_field_boost(fields.category, boosts.category);
        query_parser.set_field_boost(fields.description, boosts.description);
        query_parser.set_field_boost(fields.headings, boosts.headings);
        query_parser.set_field_boost(fields.content, boosts.content);
        let query = query_parser
            .parse_query(query_text)
            .map_err(|e| Error::Query(e.to_string()))?;

        let searcher = self.reader.searcher();
        let top_docs = searcher
            .search(&query, &TopDocs::with_limit(limit))
            .map_err(engine_error)?;
        let highlighter = Highlighter::new(&query_terms(query_text));

        let mut results = Vec::with_capacity(top_docs.len());
        for (score, doc_address) in top_docs {
            let doc: TantivyDocument = searcher.doc(doc_address).map_err(engine_error)?;
            let Some(id) = doc.get_first(fields.id).and_then(|v| v.as_str()) else {
                continue;
            };
            let Some(parsed) = self.docs.get(id) else {
                error!(%id, "indexed document missing from side-table");
                continue;
            };
            results.push(to_result(id, score, parsed, &highlighter, settings.snippet_radius));
        }
        debug!(query = query_text, hits = results.len(), "search complete");
        Ok(results)
    }
}

fn to_result(
    id: &str,
    score: f32,
    doc: &ParsedDocument,
    highlighter: &Highlighter,
    radius: usize,
) -> SearchResult {
    let content = highlighter
        .snippet(&doc.body_text, radius)
        .unwrap_or_else(|| doc.excerpt.clone());
    SearchResult {
        doc_ref: id.to_string(),
        score,
        title: doc.meta.title.clone(),
        description: doc.meta.description.clone(),
        excerpt: doc.excerpt.clone(),
        category: doc.meta.category.clone(),
        highlights: Highlights {
            title: highlighter.mark(&doc.meta.title),
            content: Some(content),
        },
    }
}

impl DocumentSearch for SearchIndex {
    fn rebuild(&self, sources: &SourceTree) -> Result<RebuildOutcome> {
        SearchIndex::rebuild(self, sources)
    }

    fn search(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        SearchIndex::search(self, query, limit)
    }

    fn document(&self, id: &str) -> Option<Arc<ParsedDocument>> {
        SearchIndex::document(self, id)
    }
}
