//! Builds the ordered category/document navigation tree from a fresh scan.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::order::OrderTables;
use crate::parser::{humanize, parse_file};
use crate::sources::{SourceEntry, SourceFile, SourceTree};
use crate::types::{DocMeta, DocTreeNode, ParsedDocument, TitleSource, DEFAULT_ORDER};

struct CategorySlot {
    name: String,
    index: Option<DocMeta>,
    children: Vec<DocTreeNode>,
}

enum Slot {
    Document(DocTreeNode),
    Category(CategorySlot),
}

/// Scan `sources` and return the sorted top-level entries.
///
/// Fails only when the root cannot be read; unparsable files are logged and
/// left out. Root and category index documents are not tree entries, a
/// category's index only contributes its metadata.
///
/// A root document named like a category directory (`guide.md` next to
/// `guide/`) never becomes a separate entry: it stands in as the category's
/// index when the directory has none and is omitted otherwise, matching
/// what `SourceTree::resolve` returns for the category path.
pub fn build_tree(sources: &SourceTree, order: &OrderTables) -> Result<Vec<DocTreeNode>> {
    let mut slots: Vec<Slot> = Vec::new();
    let mut category_slots: HashMap<String, usize> = HashMap::new();
    let mut documents = 0usize;

    // Walk order is by file name, so `name/` and everything below it comes
    // before a root file `name.ext`.
    for entry in sources.walk()? {
        let file = match entry {
            SourceEntry::Category(name) => {
                category_slots.insert(name.clone(), slots.len());
                slots.push(Slot::Category(CategorySlot {
                    name,
                    index: None,
                    children: Vec::new(),
                }));
                continue;
            }
            SourceEntry::File(file) => file,
        };
        match file.depth() {
            1 => {
                if sources.is_index(&file.rel_path) {
                    debug!(path = %file.rel_path.display(), "root index is not a tree entry");
                    continue;
                }
                let Some(doc) = parse_or_skip(&file) else {
                    continue;
                };
                match category_slots.get(&doc.meta.slug).and_then(|&i| slots.get_mut(i)) {
                    Some(Slot::Category(slot)) if slot.index.is_none() => {
                        debug!(path = %file.rel_path.display(), "document used as category index");
                        slot.index = Some(index_meta(doc, &slot.name));
                    }
                    Some(_) => warn!(
                        path = %file.rel_path.display(),
                        "shadowed by the category index of the same path, omitted from tree"
                    ),
                    None => {
                        slots.push(Slot::Document(document_node(doc, order)));
                        documents += 1;
                    }
                }
            }
            2 => {
                let Some(category) = file.category() else {
                    continue;
                };
                let Some(Slot::Category(slot)) =
                    category_slots.get(&category).and_then(|&i| slots.get_mut(i))
                else {
                    continue;
                };
                let Some(doc) = parse_or_skip(&file) else {
                    continue;
                };
                if sources.is_index(&file.rel_path) {
                    slot.index = Some(index_meta(doc, &slot.name));
                } else {
                    slot.children.push(document_node(doc, order));
                    documents += 1;
                }
            }
            _ => warn!(
                path = %file.rel_path.display(),
                "nested more than one directory deep, omitted from tree"
            ),
        }
    }

    let mut tree: Vec<DocTreeNode> = slots
        .into_iter()
        .filter_map(|slot| match slot {
            Slot::Document(node) => Some(node),
            Slot::Category(slot) if slot.index.is_none() && slot.children.is_empty() => {
                debug!(category = %slot.name, "no documents, omitted from tree");
                None
            }
            Slot::Category(slot) => Some(category_node(slot, order)),
        })
        .collect();
    tree.sort_by_key(|node| node.meta.order);
    let categories = tree.iter().filter(|node| node.is_category()).count();
    info!(entries = tree.len(), categories, documents, "built document tree");
    Ok(tree)
}

fn parse_or_skip(file: &SourceFile) -> Option<ParsedDocument> {
    match parse_file(file) {
        Ok(doc) => Some(doc),
        Err(err) => {
            warn!(path = %file.rel_path.display(), error = %err, "skipping document");
            None
        }
    }
}

/// Metadata a category takes from its index document. An index without a
/// declared title is named after the category rather than its file stem.
fn index_meta(doc: ParsedDocument, category: &str) -> DocMeta {
    let mut meta = doc.meta;
    if doc.title_source == TitleSource::Slug {
        meta.title = humanize(category);
    }
    meta.category = category.to_string();
    meta
}

fn document_node(doc: ParsedDocument, order: &OrderTables) -> DocTreeNode {
    let mut meta = doc.meta;
    meta.order = order.document(&meta.category, &meta.slug).unwrap_or(meta.order);
    let path = if meta.category.is_empty() {
        meta.slug.clone()
    } else {
        format!("{}/{}", meta.category, meta.slug)
    };
    DocTreeNode {
        name: meta.title.clone(),
        path,
        meta,
        children: None,
    }
}

fn category_node(slot: CategorySlot, order: &OrderTables) -> DocTreeNode {
    let CategorySlot {
        name,
        index,
        mut children,
    } = slot;
    let mut meta = index.unwrap_or_else(|| DocMeta {
        title: humanize(&name),
        description: None,
        order: DEFAULT_ORDER,
        tags: Vec::new(),
        category: name.clone(),
        slug: String::new(),
    });
    meta.slug = String::new();
    meta.order = order.category(&name).unwrap_or(meta.order);
    children.sort_by_key(|node| node.meta.order);
    DocTreeNode {
        name: meta.title.clone(),
        path: name,
        meta,
        children: Some(children),
    }
}
