use std::sync::{Arc, Mutex, PoisonError};

use crate::{BlobStore, Result, StoreError};

#[derive(Debug, Default)]
struct Inner {
    blob: Option<Vec<u8>>,
    failing: bool,
    saves: usize,
}

/// In-memory blob store. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryBlobStore {
    /// Empty store (nothing saved yet).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `blob`.
    #[must_use]
    pub fn with_contents(blob: Vec<u8>) -> Self {
        let store = Self::new();
        store.with_inner(|inner| inner.blob = Some(blob));
        store
    }

    /// Make every subsequent load and save fail with [`StoreError::Unavailable`].
    pub fn set_failing(&self, failing: bool) {
        self.with_inner(|inner| inner.failing = failing);
    }

    /// Copy of the current blob.
    #[must_use]
    pub fn contents(&self) -> Option<Vec<u8>> {
        self.with_inner(|inner| inner.blob.clone())
    }

    /// Number of successful saves.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.with_inner(|inner| inner.saves)
    }

    fn with_inner<T>(&self, f: impl FnOnce(&mut Inner) -> T) -> T {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

impl BlobStore for MemoryBlobStore {
    fn load(&self) -> Result<Option<Vec<u8>>> {
        self.with_inner(|inner| {
            if inner.failing {
                return Err(StoreError::Unavailable("memory store set to fail".into()));
            }
            Ok(inner.blob.clone())
        })
    }

    fn save(&self, blob: &[u8]) -> Result<()> {
        self.with_inner(|inner| {
            if inner.failing {
                return Err(StoreError::Unavailable("memory store set to fail".into()));
            }
            inner.blob = Some(blob.to_vec());
            inner.saves += 1;
            Ok(())
        })
    }
}
