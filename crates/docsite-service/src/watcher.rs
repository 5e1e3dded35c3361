//! Polling-based staleness detection for the search index.

use std::fs;
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant, UNIX_EPOCH};

use parking_lot::Mutex;
use tracing::{debug, info};
use twox_hash::XxHash64;

use docsite_core::error::Result;
use docsite_core::sources::SourceTree;
use docsite_core::traits::DocumentSearch;
use docsite_core::types::RebuildOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOutcome {
    Unchanged,
    /// Sources changed but have not been quiet for the debounce window yet.
    Pending,
    Rebuilt(RebuildOutcome),
}

/// Hash of every source file's relative path, size and modification time.
pub fn fingerprint(sources: &SourceTree) -> Result<u64> {
    let mut hasher = XxHash64::with_seed(0);
    for file in sources.list()? {
        file.rel_path.hash(&mut hasher);
        if let Ok(meta) = fs::metadata(&file.abs_path) {
            meta.len().hash(&mut hasher);
            let modified = meta
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok());
            modified.map(|d| d.as_nanos()).hash(&mut hasher);
        }
    }
    Ok(hasher.finish())
}

struct WatchState {
    published: u64,
    pending: Option<(u64, Instant)>,
}

/// Triggers a full rebuild once the source fingerprint has changed and then
/// stayed the same for `debounce`, so a burst of saves costs one rebuild.
///
/// Create it right after the index was built: the fingerprint at creation
/// time counts as already indexed.
pub struct StalenessWatcher {
    sources: SourceTree,
    debounce: Duration,
    state: Mutex<WatchState>,
}

impl StalenessWatcher {
    pub fn new(sources: SourceTree, debounce: Duration) -> Result<Self> {
        let published = fingerprint(&sources)?;
        Ok(Self {
            sources,
            debounce,
            state: Mutex::new(WatchState {
                published,
                pending: None,
            }),
        })
    }

    pub fn poll<S: DocumentSearch + ?Sized>(&self, engine: &S) -> Result<WatchOutcome> {
        let current = fingerprint(&self.sources)?;
        let mut state = self.state.lock();
        if current == state.published {
            state.pending = None;
            return Ok(WatchOutcome::Unchanged);
        }

        let now = Instant::now();
        match state.pending {
            Some((seen, since)) if seen == current => {
                if now.duration_since(since) < self.debounce {
                    return Ok(WatchOutcome::Pending);
                }
            }
            _ => {
                debug!(fingerprint = current, "sources changed");
                state.pending = Some((current, now));
                if !self.debounce.is_zero() {
                    return Ok(WatchOutcome::Pending);
                }
            }
        }

        let outcome = engine.rebuild(&self.sources)?;
        state.published = current;
        state.pending = None;
        info!(?outcome, "rebuilt stale search index");
        Ok(WatchOutcome::Rebuilt(outcome))
    }
}
