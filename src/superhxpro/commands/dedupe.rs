//! Content deduplication.
//!
//! Files are hashed with SHA-256 in traversal order. The first file seen with a
//! given digest is the original and is never touched; every later file with the
//! same digest is a duplicate of it.
//!
//! A file reached twice (through a hard link, or through a symlinked directory
//! when links are followed) is hashed only once. Symlinks to files are skipped
//! unless links are followed, so deleting a duplicate never removes the target
//! of a link that was seen first.

use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::SidecarStore;
use crate::walker::{Depth, Walker};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default read size when hashing.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupeMode {
    /// Report duplicates only.
    #[default]
    DryRun,
    /// Remove each duplicate as soon as it is found.
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Duplicate {
    pub path: PathBuf,
    pub original: PathBuf,
    pub removed: bool,
}

#[cfg(unix)]
type FileId = (u64, u64);
#[cfg(not(unix))]
type FileId = PathBuf;

/// What `path` resolves to on disk, following symlinks.
#[cfg(unix)]
fn file_id(path: &Path) -> io::Result<FileId> {
    use std::os::unix::fs::MetadataExt;
    let meta = fs::metadata(path)?;
    Ok((meta.dev(), meta.ino()))
}

#[cfg(not(unix))]
fn file_id(path: &Path) -> io::Result<FileId> {
    fs::canonicalize(path)
}

/// Hex SHA-256 of the file at `path`, read `chunk_size` bytes at a time.
pub fn hash_file(path: &Path, chunk_size: usize) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; chunk_size.max(1)];

    loop {
        match file.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buf[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(format!("{:x}", hasher.finalize()))
}

pub fn run<S: SidecarStore>(
    store: &S,
    root: &Path,
    mode: DedupeMode,
    chunk_size: usize,
    follow_links: bool,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let mut seen: HashMap<String, PathBuf> = HashMap::new();
    let mut visited: HashSet<FileId> = HashSet::new();

    let issues = Walker::new(store, Depth::Recursive)
        .follow_links(follow_links)
        .walk(root, |visit| {
            for file in &visit.files {
                if file.broken_link {
                    debug!("Skipping broken link '{}'", file.path.display());
                    continue;
                }
                if file.symlink && !follow_links {
                    debug!("Skipping symlink '{}'", file.path.display());
                    continue;
                }
                result.tally.processed += 1;

                let hashed = file_id(&file.path).and_then(|id| {
                    if visited.insert(id) {
                        hash_file(&file.path, chunk_size).map(Some)
                    } else {
                        Ok(None)
                    }
                });
                let digest = match hashed {
                    Ok(Some(digest)) => digest,
                    Ok(None) => {
                        debug!("Already hashed '{}' via another path", file.path.display());
                        continue;
                    }
                    Err(e) => {
                        warn!("Cannot hash '{}': {}", file.path.display(), e);
                        result.tally.failed += 1;
                        result.add_message(CmdMessage::error(format!(
                            "  Error reading file '{}' for hashing: {}",
                            file.path.display(),
                            e
                        )));
                        continue;
                    }
                };

                let Some(original) = seen.get(&digest) else {
                    seen.insert(digest, file.path.clone());
                    continue;
                };

                result.tally.duplicates += 1;
                result.add_message(CmdMessage::warning(format!(
                    "  Duplicate found: '{}' (original: '{}')",
                    file.path.display(),
                    original.display()
                )));

                let mut removed = false;
                if mode == DedupeMode::Delete {
                    match fs::remove_file(&file.path) {
                        Ok(()) => {
                            removed = true;
                            result.tally.deleted += 1;
                            result.add_message(CmdMessage::success(format!(
                                "    Deleted: '{}'",
                                file.path.display()
                            )));
                        }
                        Err(e) => {
                            result.tally.failed += 1;
                            result.add_message(CmdMessage::error(format!(
                                "    Error deleting '{}': {}",
                                file.path.display(),
                                e
                            )));
                        }
                    }
                }

                result.duplicates.push(Duplicate {
                    path: file.path.clone(),
                    original: original.clone(),
                    removed,
                });
            }
        })?;
    result.add_walk_issues(issues);

    let summary = match mode {
        DedupeMode::Delete => format!(
            "Finished. Found {} duplicate(s). Deleted {} file(s).",
            result.tally.duplicates, result.tally.deleted
        ),
        DedupeMode::DryRun => format!(
            "Finished. Found {} duplicate(s). Would delete {} file(s).",
            result.tally.duplicates, result.tally.duplicates
        ),
    };
    result.add_message(CmdMessage::success(summary));

    Ok(result)
}
