//! The in-memory chunk index and its publication slot.
//!
//! An [`Index`] is immutable once built. [`IndexHandle`] holds the current
//! one behind `RwLock<Arc<Index>>`: readers clone the `Arc` and work on that
//! snapshot for the whole operation, while ingest builds a complete new
//! `Index` off to the side and swaps it in with a single write. A query in
//! flight therefore sees all of the old index or all of the new one.
//!
//! ```text
//!   ingest ──build──▶ Index(new) ──replace()──▶ ┌────────────────────┐
//!                                               │ RwLock<Arc<Index>> │
//!   search/ask ◀──────────snapshot()─────────── └────────────────────┘
//! ```

use std::sync::{Arc, RwLock};
use tokio::sync::{Mutex, MutexGuard};

use crate::models::Chunk;

/// An ordered, immutable collection of chunks.
#[derive(Debug, Default)]
pub struct Index {
    chunks: Vec<Arc<Chunk>>,
}

impl Index {
    pub fn new(chunks: Vec<Chunk>) -> Self {
        Self {
            chunks: chunks.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn chunks(&self) -> &[Arc<Chunk>] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Shared, swappable slot for the current [`Index`].
#[derive(Debug, Default)]
pub struct IndexHandle {
    current: RwLock<Arc<Index>>,
    ingest: Mutex<()>,
}

impl IndexHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// The index as of now. Later ingests do not affect the returned value.
    pub fn snapshot(&self) -> Arc<Index> {
        // The slot only ever holds a complete Arc, so a poisoned lock still
        // holds a consistent value.
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&*guard)
    }

    /// Publish `index`, returning the one it replaced.
    pub fn replace(&self, index: Index) -> Arc<Index> {
        let next = Arc::new(index);
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *guard, next)
    }

    /// Serializes ingest runs. Held for the whole build, never by readers.
    pub async fn lock_ingest(&self) -> MutexGuard<'_, ()> {
        self.ingest.lock().await
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}
