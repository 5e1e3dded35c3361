//! Domain types shared by the parser, the tree builder and the search engine.

use serde::{Deserialize, Serialize};

/// Document identifier: the source path relative to the docs root, without
/// its extension, always `/`-separated (e.g. `guide/install`).
pub type DocId = String;

/// Order given to documents and categories that declare none.
pub const DEFAULT_ORDER: i32 = 999;

/// Metadata of one document, merged from front-matter and path-derived values.
///
/// - `category` is the first directory segment, empty for root-level files
/// - `slug` is the file stem
/// - `order` is `DEFAULT_ORDER` unless front-matter sets it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocMeta {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub order: i32,
    #[serde(default)]
    pub tags: Vec<String>,
    pub category: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub text: String,
    pub level: u8,
    pub id: String,
}

/// Where a document's title came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TitleSource {
    FrontMatter,
    Heading,
    /// Nothing declared a title; it was derived from the file stem.
    #[default]
    Slug,
}

/// Output of parsing one source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDocument {
    pub meta: DocMeta,
    #[serde(skip)]
    pub title_source: TitleSource,
    /// Markdown body with the front-matter block removed.
    pub body_text: String,
    /// Rendered body. Level-1 headings are omitted.
    pub html: String,
    pub headings: Vec<Heading>,
    pub excerpt: String,
}

/// One entry of the navigation tree. Category nodes carry `children`,
/// document nodes do not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocTreeNode {
    pub name: String,
    pub path: String,
    pub meta: DocMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<DocTreeNode>>,
}

impl DocTreeNode {
    pub fn is_category(&self) -> bool {
        self.children.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlights {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// A ranked search hit. `score` is engine-specific, higher is better, and is
/// not comparable across index rebuilds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(rename = "ref")]
    pub doc_ref: DocId,
    pub score: f32,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub excerpt: String,
    pub category: String,
    pub highlights: Highlights,
}

/// What a rebuild request ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildOutcome {
    /// A new index was built and published.
    Published { documents: usize, skipped: usize },
    /// Another rebuild that started after this request already covered it.
    Coalesced,
}
