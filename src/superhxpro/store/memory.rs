use super::SidecarStore;
use crate::error::{HelperError, Result};
use crate::model::MetadataDocument;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// In-memory sidecar store for testing.
///
/// Uses `RefCell` for interior mutability since the tool is single-threaded,
/// which lets the `SidecarStore` trait take `&self` everywhere.
#[derive(Default)]
pub struct InMemoryStore {
    documents: RefCell<HashMap<PathBuf, MetadataDocument>>,
    corrupt: RefCell<HashSet<PathBuf>>,
    reads: Cell<usize>,
    saves: Cell<usize>,
    simulate_write_error: Cell<bool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of reads so far, successful or not.
    pub fn read_count(&self) -> usize {
        self.reads.get()
    }

    /// Number of successful writes so far.
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    /// Make reads of `dir` fail as if its sidecar were unparsable.
    pub fn mark_corrupt(&self, dir: &Path) {
        self.corrupt.borrow_mut().insert(dir.to_path_buf());
    }

    /// Seed a document without counting it as a save.
    pub fn insert(&self, dir: &Path, doc: MetadataDocument) {
        self.documents.borrow_mut().insert(dir.to_path_buf(), doc);
    }
}

impl SidecarStore for InMemoryStore {
    fn read(&self, dir: &Path) -> Result<Option<MetadataDocument>> {
        self.reads.set(self.reads.get() + 1);
        if self.corrupt.borrow().contains(dir) {
            return Err(HelperError::CorruptMetadata {
                path: dir.to_path_buf(),
                reason: "simulated corruption".to_string(),
            });
        }
        Ok(self.documents.borrow().get(dir).cloned())
    }

    fn write(&self, dir: &Path, doc: &MetadataDocument) -> Result<()> {
        if self.simulate_write_error.get() {
            return Err(HelperError::Store("Simulated write error".to_string()));
        }
        self.corrupt.borrow_mut().remove(dir);
        self.documents
            .borrow_mut()
            .insert(dir.to_path_buf(), doc.clone());
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
