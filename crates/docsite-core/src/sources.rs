//! Enumeration and addressing of source documents under a docs root.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::warn;
use walkdir::{DirEntry, WalkDir};

use crate::error::{Error, Result};
use crate::types::DocId;

/// A source file, addressed both relative to the docs root and absolutely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub rel_path: PathBuf,
    pub abs_path: PathBuf,
}

impl SourceFile {
    pub fn id(&self) -> DocId {
        doc_id(&self.rel_path)
    }

    /// Number of path components, 1 for a file directly under the root.
    pub fn depth(&self) -> usize {
        self.rel_path.components().count()
    }

    /// First path segment when the file sits inside a directory.
    pub fn category(&self) -> Option<String> {
        if self.depth() < 2 {
            return None;
        }
        self.rel_path
            .components()
            .next()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
    }
}

/// One step of a walk over the docs root, in lexicographic order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEntry {
    /// A first-level subdirectory.
    Category(String),
    File(SourceFile),
}

/// Strip the extension of a relative path and join it with `/`.
pub fn doc_id(rel_path: &Path) -> DocId {
    rel_path
        .with_extension("")
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// The docs root together with the conventions that identify source files
/// (accepted extensions) and category index documents (their file stem).
#[derive(Debug, Clone)]
pub struct SourceTree {
    root: PathBuf,
    extensions: Vec<String>,
    index_stem: String,
}

impl SourceTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: vec!["md".to_string()],
            index_stem: "README".to_string(),
        }
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.into().trim_start_matches('.').to_string())
            .collect();
        self
    }

    pub fn with_index_stem(mut self, stem: impl Into<String>) -> Self {
        self.index_stem = stem.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index_stem(&self) -> &str {
        &self.index_stem
    }

    /// Fails with `Error::Io` when the root cannot be listed.
    pub fn ensure_readable(&self) -> Result<()> {
        fs::read_dir(&self.root).map(|_| ()).map_err(|e| Error::io(&self.root, e))
    }

    pub fn is_source(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    /// Whether the file is a category (or root) index document.
    pub fn is_index(&self, rel_path: &Path) -> bool {
        rel_path.file_stem().and_then(|s| s.to_str()) == Some(self.index_stem.as_str())
    }

    /// Walk the root depth-first, sorted by file name. Unreadable entries
    /// below the root are logged and skipped.
    pub fn walk(&self) -> Result<Vec<SourceEntry>> {
        self.ensure_readable()?;
        let mut entries = Vec::new();
        let walker = WalkDir::new(&self.root).min_depth(1).sort_by_file_name().into_iter();
        for entry in walker.filter_entry(|e| !is_hidden(e)) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            let rel_path = entry
                .path()
                .strip_prefix(&self.root)
                .unwrap_or(entry.path())
                .to_path_buf();
            if entry.file_type().is_dir() {
                if entry.depth() == 1 {
                    let name = entry.file_name().to_string_lossy().into_owned();
                    entries.push(SourceEntry::Category(name));
                }
            } else if entry.file_type().is_file() && self.is_source(entry.path()) {
                entries.push(SourceEntry::File(SourceFile {
                    rel_path,
                    abs_path: entry.path().to_path_buf(),
                }));
            }
        }
        Ok(entries)
    }

    /// All source files in walk order.
    pub fn list(&self) -> Result<Vec<SourceFile>> {
        Ok(self
            .walk()?
            .into_iter()
            .filter_map(|entry| match entry {
                SourceEntry::File(file) => Some(file),
                SourceEntry::Category(_) => None,
            })
            .collect())
    }

    /// Map a tree path or document id to its source file.
    ///
    /// The empty path is the root index document. A path naming a directory
    /// with an index document resolves to that index, even when a file of
    /// the same name sits next to the directory.
    pub fn resolve(&self, path: &str) -> Result<SourceFile> {
        let trimmed = path.trim_matches('/');
        let rel = Path::new(trimmed);
        if rel.components().any(|c| !matches!(c, Component::Normal(_))) {
            return Err(Error::NotFound(path.to_string()));
        }
        if let Some(index) = self.category_index(trimmed) {
            return Ok(index);
        }
        if !trimmed.is_empty() {
            if let Some(file) = self.find_with_extension(trimmed) {
                return Ok(file);
            }
        }
        Err(Error::NotFound(if trimmed.is_empty() {
            "root index document".to_string()
        } else {
            trimmed.to_string()
        }))
    }

    /// The index document of directory `dir` (`""` for the root), if any.
    pub fn category_index(&self, dir: &str) -> Option<SourceFile> {
        if !self.root.join(dir).is_dir() {
            return None;
        }
        let index = if dir.is_empty() {
            self.index_stem.clone()
        } else {
            format!("{}/{}", dir, self.index_stem)
        };
        self.find_with_extension(&index)
    }

    fn find_with_extension(&self, rel_without_ext: &str) -> Option<SourceFile> {
        self.extensions.iter().find_map(|ext| {
            let rel_path = PathBuf::from(format!("{}.{}", rel_without_ext, ext));
            let abs_path = self.root.join(&rel_path);
            abs_path.is_file().then_some(SourceFile { rel_path, abs_path })
        })
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_str().is_some_and(|name| name.starts_with('.'))
}
