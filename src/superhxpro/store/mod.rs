//! # Storage Layer
//!
//! Sidecar documents are read and written through the [`SidecarStore`] trait so
//! the attribute editor, the query evaluator and the catalog builder never deal
//! with serialization or file handles directly.
//!
//! ## Implementations
//!
//! - [`fs::FsStore`]: production store. One pretty-printed JSON file per
//!   directory, written atomically (temp file + rename).
//! - [`memory::InMemoryStore`]: keeps documents in a map keyed by directory.
//!   Counts saves and can simulate write failures, for tests.
//!
//! ## Failure Model
//!
//! [`SidecarStore::read`] is the raw, fallible read. [`SidecarStore::load`] is
//! what commands use: it never fails, and turns a missing, empty or corrupt
//! sidecar into an empty document after logging why. [`SidecarStore::save`]
//! logs failures and hands them back so the call site can report them; the
//! caller's in-memory document remains the truth for the rest of the run.

use crate::error::{HelperError, Result};
use crate::model::MetadataDocument;
use std::path::Path;
use tracing::{error, warn};

pub mod fs;
pub mod memory;

pub trait SidecarStore {
    /// Read the document of `dir`.
    ///
    /// `Ok(None)` when there is no sidecar or it is empty. Errors are returned
    /// for unreadable or unparsable sidecars.
    fn read(&self, dir: &Path) -> Result<Option<MetadataDocument>>;

    /// Write the document of `dir`, creating the directory if needed.
    /// MUST be all-or-nothing.
    fn write(&self, dir: &Path, doc: &MetadataDocument) -> Result<()>;

    /// Load the document of `dir`, recovering to an empty document on any
    /// failure.
    fn load(&self, dir: &Path) -> MetadataDocument {
        self.load_recovering(dir).0
    }

    /// Like [`load`](Self::load), but also hands back the failure that was
    /// recovered from.
    fn load_recovering(&self, dir: &Path) -> (MetadataDocument, Option<HelperError>) {
        match self.read(dir) {
            Ok(doc) => (doc.unwrap_or_default(), None),
            Err(e) => {
                match &e {
                    HelperError::CorruptMetadata { path, reason } => warn!(
                        "Corrupted metadata file '{}' ({}). Starting from an empty document.",
                        path.display(),
                        reason
                    ),
                    _ => error!(
                        "Error reading metadata in '{}': {}. Starting from an empty document.",
                        dir.display(),
                        e
                    ),
                }
                (MetadataDocument::new(), Some(e))
            }
        }
    }

    fn save(&self, dir: &Path, doc: &MetadataDocument) -> Result<()> {
        self.write(dir, doc).inspect_err(|e| {
            error!("Error saving metadata in '{}': {}", dir.display(), e);
        })
    }
}
