//! Curated display order for categories and documents.
//!
//! Lookups here take precedence over the `order` front-matter field, which in
//! turn takes precedence over `DEFAULT_ORDER`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Category name -> order, and category name -> slug -> order. Root-level
/// documents live under the empty category name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderTables {
    pub categories: BTreeMap<String, i32>,
    pub documents: BTreeMap<String, BTreeMap<String, i32>>,
}

impl OrderTables {
    /// The built-in table for the well-known documentation sections.
    pub fn curated() -> Self {
        Self::default()
            .with_category("getting-started", 1)
            .with_category("guide", 2)
            .with_category("concepts", 3)
            .with_category("reference", 4)
            .with_category("api", 5)
            .with_category("faq", 6)
            .with_document("getting-started", "installation", 1)
            .with_document("getting-started", "quick-start", 2)
            .with_document("getting-started", "configuration", 3)
    }

    pub fn with_category(mut self, category: impl Into<String>, order: i32) -> Self {
        self.categories.insert(category.into(), order);
        self
    }

    pub fn with_document(
        mut self,
        category: impl Into<String>,
        slug: impl Into<String>,
        order: i32,
    ) -> Self {
        self.documents
            .entry(category.into())
            .or_default()
            .insert(slug.into(), order);
        self
    }

    pub fn category(&self, category: &str) -> Option<i32> {
        self.categories.get(category).copied()
    }

    pub fn document(&self, category: &str, slug: &str) -> Option<i32> {
        self.documents
            .get(category)
            .and_then(|docs| docs.get(slug))
            .copied()
    }
}
