//! # Tree Walker
//!
//! Drives every metadata-aware command. The walker visits directories, not
//! files: for each directory it lists the immediate children once, loads the
//! sidecar document once, and hands both to the command as a [`DirVisit`].
//! Commands then work file-by-file against that single in-memory document and
//! decide themselves whether to save it back.
//!
//! Traversal is pre-order (a directory comes before its own children) and
//! children are visited in file-name order, so runs over an unchanged tree
//! always see files in the same order. The sidecar file is never reported as a
//! file or a subdirectory.

use crate::error::{HelperError, Result};
use crate::model::{MetadataDocument, SIDECAR_FILE_NAME};
use crate::store::SidecarStore;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    /// The root directory and its immediate children only.
    Shallow,
    /// The whole subtree.
    Recursive,
}

impl Depth {
    pub fn from_recursive(recursive: bool) -> Self {
        if recursive {
            Depth::Recursive
        } else {
            Depth::Shallow
        }
    }
}

/// A non-directory child of a visited directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    /// A symlink, live or broken.
    pub symlink: bool,
    /// A symlink whose target does not exist.
    pub broken_link: bool,
}

/// One visited directory with its sidecar document already loaded.
#[derive(Debug, Clone)]
pub struct DirVisit {
    pub dir: PathBuf,
    /// Path relative to the walk root; empty for the root itself.
    pub relative: PathBuf,
    /// Empty when the sidecar could not be read; see `load_error`.
    pub document: MetadataDocument,
    /// Why the sidecar could not be read, if it could not.
    pub load_error: Option<String>,
    pub subdirs: Vec<String>,
    pub files: Vec<FileEntry>,
}

/// Something the walker could not read. The walk continues past it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkIssue {
    pub path: PathBuf,
    pub message: String,
}

/// Per-command counters, accumulated over a whole walk.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub processed: usize,
    pub matched: usize,
    pub updated: usize,
    pub duplicates: usize,
    pub deleted: usize,
    pub failed: usize,
}

pub struct Walker<'a, S: SidecarStore> {
    store: &'a S,
    depth: Depth,
    follow_links: bool,
}

impl<'a, S: SidecarStore> Walker<'a, S> {
    pub fn new(store: &'a S, depth: Depth) -> Self {
        Self {
            store,
            depth,
            follow_links: false,
        }
    }

    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Walk `root`, calling `visit` once per directory.
    ///
    /// Fails only when `root` is missing or not a directory. Anything unreadable
    /// below it is logged and returned as a [`WalkIssue`].
    pub fn walk<F>(&self, root: &Path, mut visit: F) -> Result<Vec<WalkIssue>>
    where
        F: FnMut(DirVisit),
    {
        ensure_directory(root)?;

        let max_depth = match self.depth {
            Depth::Shallow => 0,
            Depth::Recursive => usize::MAX,
        };
        let entries = WalkDir::new(root)
            .follow_links(self.follow_links)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || e.file_name() != SIDECAR_FILE_NAME);

        let mut issues = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    warn!("Cannot access '{}': {}", path.display(), e);
                    issues.push(WalkIssue {
                        path,
                        message: e.to_string(),
                    });
                    continue;
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }

            let dir = entry.path();
            let (subdirs, files) = match list_children(dir, &mut issues) {
                Ok(children) => children,
                Err(e) => {
                    warn!("Cannot list '{}': {}", dir.display(), e);
                    issues.push(WalkIssue {
                        path: dir.to_path_buf(),
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            let relative = dir.strip_prefix(root).unwrap_or(dir).to_path_buf();
            let (document, load_error) = self.store.load_recovering(dir);
            visit(DirVisit {
                dir: dir.to_path_buf(),
                relative,
                document,
                load_error: load_error.map(|e| e.to_string()),
                subdirs,
                files,
            });
        }

        Ok(issues)
    }
}

/// Fail with `NotFound` / `NotADirectory` unless `path` is a directory.
pub fn ensure_directory(path: &Path) -> Result<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(HelperError::NotADirectory(path.to_path_buf())),
        Err(_) => Err(HelperError::NotFound(path.to_path_buf())),
    }
}

fn list_children(
    dir: &Path,
    issues: &mut Vec<WalkIssue>,
) -> std::io::Result<(Vec<String>, Vec<FileEntry>)> {
    let mut children: Vec<_> = fs::read_dir(dir)?.collect();
    children.sort_by_key(|entry| entry.as_ref().map(|e| e.file_name()).ok());

    let mut subdirs = Vec::new();
    let mut files = Vec::new();

    for child in children {
        let child = match child {
            Ok(child) => child,
            Err(e) => {
                issues.push(WalkIssue {
                    path: dir.to_path_buf(),
                    message: e.to_string(),
                });
                continue;
            }
        };
        let name = child.file_name().to_string_lossy().into_owned();
        if name == SIDECAR_FILE_NAME {
            continue;
        }
        let path = child.path();

        let file_type = match child.file_type() {
            Ok(ft) => ft,
            Err(e) => {
                issues.push(WalkIssue {
                    path,
                    message: e.to_string(),
                });
                continue;
            }
        };

        if file_type.is_symlink() {
            match fs::metadata(&path) {
                Ok(target) if target.is_dir() => subdirs.push(name),
                Ok(target) if target.is_file() => files.push(FileEntry {
                    name,
                    path,
                    symlink: true,
                    broken_link: false,
                }),
                Ok(_) => debug!("Skipping special file '{}'", path.display()),
                Err(_) => files.push(FileEntry {
                    name,
                    path,
                    symlink: true,
                    broken_link: true,
                }),
            }
        } else if file_type.is_dir() {
            subdirs.push(name);
        } else if file_type.is_file() {
            files.push(FileEntry {
                name,
                path,
                symlink: false,
                broken_link: false,
            });
        } else {
            debug!("Skipping special file '{}'", path.display());
        }
    }

    Ok((subdirs, files))
}
