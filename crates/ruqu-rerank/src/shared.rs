//! Swappable handle to the live corpus
//!
//! Readers take an `Arc` snapshot under a brief read lock and score against it
//! lock-free. A reindex builds a fresh [`CorpusStateStore`] elsewhere and
//! installs it with [`SharedCorpus::replace`]; queries already holding the old
//! snapshot finish against it undisturbed.

use crate::store::CorpusStateStore;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

/// Cloneable, thread-safe handle to the current corpus store.
#[derive(Debug, Clone)]
pub struct SharedCorpus {
    inner: Arc<RwLock<Arc<CorpusStateStore>>>,
}

impl SharedCorpus {
    pub fn new(store: CorpusStateStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(store))),
        }
    }

    /// The store currently installed.
    pub fn current(&self) -> Arc<CorpusStateStore> {
        self.inner.read().clone()
    }

    /// Atomically install a rebuilt store, returning the previous one.
    pub fn replace(&self, store: CorpusStateStore) -> Arc<CorpusStateStore> {
        let next = Arc::new(store);
        let documents = next.len();
        let previous = std::mem::replace(&mut *self.inner.write(), next);
        info!(
            documents,
            previous_documents = previous.len(),
            "corpus store swapped"
        );
        previous
    }
}

impl From<CorpusStateStore> for SharedCorpus {
    fn from(store: CorpusStateStore) -> Self {
        SharedCorpus::new(store)
    }
}
