use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy};
use tracing::{debug, info, warn};

use docsite_core::config::SearchConfig;
use docsite_core::error::{Error, Result};
use docsite_core::parser::parse_file;
use docsite_core::sources::{SourceFile, SourceTree};
use docsite_core::types::{DocId, ParsedDocument, RebuildOutcome};

use crate::tantivy_utils::{build_schema, register_tokenizer, DocFields};

const WRITER_MEMORY_BYTES: usize = 50_000_000;

pub(crate) fn engine_error(err: tantivy::TantivyError) -> Error {
    Error::Index(err.to_string())
}

/// One fully built index together with the parsed documents it was built
/// from. Never mutated after construction.
pub(crate) struct IndexSnapshot {
    pub(crate) index: Index,
    pub(crate) reader: IndexReader,
    pub(crate) fields: DocFields,
    pub(crate) docs: HashMap<DocId, Arc<ParsedDocument>>,
}

impl IndexSnapshot {
    fn empty() -> Result<Self> {
        Ok(Self::build(&[])?.0)
    }

    /// Parse and index `files`. Files that fail to parse are logged and
    /// counted in the second tuple element.
    fn build(files: &[SourceFile]) -> Result<(Self, usize)> {
        let (schema, fields) = build_schema();
        let index = Index::create_in_ram(schema);
        register_tokenizer(&index);
        let mut writer: IndexWriter = index
            .writer_with_num_threads(1, WRITER_MEMORY_BYTES)
            .map_err(engine_error)?;

        let mut docs = HashMap::with_capacity(files.len());
        let mut skipped = 0;
        for file in files {
            let parsed = match parse_file(file) {
                Ok(parsed) => parsed,
                Err(err) => {
                    warn!(
                        path = %file.rel_path.display(),
                        error = %err,
                        "skipping document in search index"
                    );
                    skipped += 1;
                    continue;
                }
            };
            let id = file.id();
            let headings = parsed
                .headings
                .iter()
                .map(|h| h.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            writer
                .add_document(doc!(
                    fields.id => id.clone(),
                    fields.title => parsed.meta.title.clone(),
                    fields.description => parsed.meta.description.clone().unwrap_or_default(),
                    fields.headings => headings,
                    fields.content => parsed.body_text.clone(),
                    fields.category => parsed.meta.category.clone(),
                ))
                .map_err(engine_error)?;
            debug!(%id, "indexed document");
            docs.insert(id, Arc::new(parsed));
        }
        writer.commit().map_err(engine_error)?;

        let reader: IndexReader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(engine_error)?;
        Ok((
            Self {
                index,
                reader,
                fields,
                docs,
            },
            skipped,
        ))
    }
}

/// The process-wide search index.
///
/// Readers always see one complete snapshot: a rebuild constructs the new
/// index and its side-table off to the side and publishes both with a single
/// pointer swap. At most one rebuild runs at a time; requests that arrive
/// while one is running are served by the next build instead of queueing a
/// build each.
pub struct SearchIndex {
    pub(crate) settings: SearchConfig,
    current: RwLock<Arc<IndexSnapshot>>,
    build_lock: Mutex<()>,
    requested: AtomicU64,
    built_through: AtomicU64,
    generation: AtomicU64,
}

impl SearchIndex {
    /// An empty index; call `rebuild` to load documents.
    pub fn new(settings: SearchConfig) -> Result<Self> {
        Ok(Self {
            settings,
            current: RwLock::new(Arc::new(IndexSnapshot::empty()?)),
            build_lock: Mutex::new(()),
            requested: AtomicU64::new(0),
            built_through: AtomicU64::new(0),
            generation: AtomicU64::new(0),
        })
    }

    /// Build and publish a new index from every source file under `sources`.
    ///
    /// Fails only if the root cannot be read or the engine fails; the
    /// previously published index stays in place in that case.
    pub fn rebuild(&self, sources: &SourceTree) -> Result<RebuildOutcome> {
        let ticket = self.requested.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = self.build_lock.lock();
        if self.built_through.load(Ordering::SeqCst) >= ticket {
            debug!(ticket, "rebuild request already covered");
            return Ok(RebuildOutcome::Coalesced);
        }
        // Every request up to here is answered by the scan that follows.
        let covers = self.requested.load(Ordering::SeqCst);

        let files = sources.list()?;
        let (snapshot, skipped) = IndexSnapshot::build(&files)?;
        let documents = snapshot.docs.len();
        *self.current.write() = Arc::new(snapshot);
        self.built_through.store(covers, Ordering::SeqCst);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        info!(
            documents,
            skipped,
            generation,
            root = %sources.root().display(),
            "published search index"
        );
        Ok(RebuildOutcome::Published { documents, skipped })
    }

    /// Number of indexes published so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.snapshot().docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn document(&self, id: &str) -> Option<Arc<ParsedDocument>> {
        self.snapshot().docs.get(id).cloned()
    }

    pub(crate) fn snapshot(&self) -> Arc<IndexSnapshot> {
        Arc::clone(&self.current.read())
    }
}
