//! In-memory store implementation for testing.
//!
//! Provides [`MemStore`] for unit testing without filesystem access.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use crate::{ArtifactStore, StoreError};

/// Backend identifier for error messages.
const BACKEND: &str = "Mem";

/// In-memory [`ArtifactStore`] for tests.
///
/// Stores artifacts in a mutex-guarded map. Names are kept verbatim; no
/// path validation is applied beyond what callers exercise.
#[derive(Default)]
pub struct MemStore {
    entries: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored artifacts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True when nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ArtifactStore for MemStore {
    fn put(&self, name: &str, contents: &[u8]) -> Result<(), StoreError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_owned(), contents.to_vec());
        Ok(())
    }

    fn get(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::not_found(name).with_backend(BACKEND))
    }

    fn exists(&self, name: &str) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }
}
