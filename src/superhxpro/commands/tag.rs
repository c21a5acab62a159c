//! File tagging.
//!
//! `run` edits the tags of one file, or of every file in a directory (shallow or
//! recursive). Each file's new tag set is `(current ∪ add) \ remove`. Files whose
//! tags come out unchanged are left alone, and a directory's sidecar is written
//! at most once, after all of its files have been processed.

use crate::commands::{CmdMessage, CmdResult};
use crate::error::{HelperError, Result};
use crate::model::{MetadataDocument, SIDECAR_FILE_NAME};
use crate::store::SidecarStore;
use crate::walker::{Depth, Walker};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Tags to add and tags to remove, already cleaned up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDelta {
    pub add: BTreeSet<String>,
    pub remove: BTreeSet<String>,
}

impl TagDelta {
    /// Build from two comma-separated lists, e.g. `"work, urgent"` and `"old"`.
    pub fn parse(add: &str, remove: &str) -> Self {
        Self {
            add: parse_tag_list(add),
            remove: parse_tag_list(remove),
        }
    }

    pub fn apply(&self, current: &BTreeSet<String>) -> BTreeSet<String> {
        current
            .union(&self.add)
            .filter(|tag| !self.remove.contains(*tag))
            .cloned()
            .collect()
    }
}

/// Split a comma-separated list, trimming each tag and dropping empty ones.
pub fn parse_tag_list(list: &str) -> BTreeSet<String> {
    list.split(',')
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

fn describe(tags: &BTreeSet<String>) -> String {
    if tags.is_empty() {
        "[No tags]".to_string()
    } else {
        tags.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Apply `delta` to `path`: a single file, or the files of a directory.
pub fn run<S: SidecarStore>(
    store: &S,
    path: &Path,
    delta: &TagDelta,
    depth: Depth,
    follow_links: bool,
) -> Result<CmdResult> {
    let meta = fs::metadata(path).map_err(|_| HelperError::NotFound(path.to_path_buf()))?;
    let mut result = CmdResult::default();

    if meta.is_dir() {
        let issues = Walker::new(store, depth)
            .follow_links(follow_links)
            .walk(path, |mut visit| {
                let mut pending = 0;
                for file in &visit.files {
                    if file.broken_link {
                        debug!("Skipping broken link '{}'", file.path.display());
                        continue;
                    }
                    if retag(&mut visit.document, &file.name, &file.path, delta, &mut result) {
                        pending += 1;
                    }
                }
                if pending > 0 {
                    commit(store, &visit.dir, &visit.document, pending, &mut result);
                }
            })?;
        result.add_walk_issues(issues);
    } else {
        let name = match path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => return Err(HelperError::NotFound(path.to_path_buf())),
        };
        if name == SIDECAR_FILE_NAME {
            return Err(HelperError::InvalidArgument(format!(
                "'{}' is a metadata file and cannot be tagged",
                path.display()
            )));
        }
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut doc = store.load(dir);
        if retag(&mut doc, &name, path, delta, &mut result) {
            commit(store, dir, &doc, 1, &mut result);
        }
    }

    result.add_message(CmdMessage::success(format!(
        "Finished tagging. Processed {} file(s).",
        result.tally.updated
    )));
    Ok(result)
}

/// Edit one file's tags inside `doc`. Returns whether anything changed.
fn retag(
    doc: &mut MetadataDocument,
    name: &str,
    path: &Path,
    delta: &TagDelta,
    result: &mut CmdResult,
) -> bool {
    result.tally.processed += 1;
    let current = doc.tags(name);
    let updated = delta.apply(&current);

    if updated == current {
        result.add_message(CmdMessage::info(format!(
            "  No tag changes for '{}'. Current tags: {}",
            path.display(),
            describe(&current)
        )));
        return false;
    }

    result.add_message(CmdMessage::info(format!(
        "  Updated tags for '{}': {}",
        path.display(),
        describe(&updated)
    )));
    doc.set_tags(name, updated);
    true
}

/// Save a directory's document once; `pending` files only count as updated if
/// the write lands.
fn commit<S: SidecarStore>(
    store: &S,
    dir: &Path,
    doc: &MetadataDocument,
    pending: usize,
    result: &mut CmdResult,
) {
    match store.save(dir, doc) {
        Ok(()) => result.tally.updated += pending,
        Err(e) => {
            result.tally.failed += pending;
            result.add_message(CmdMessage::error(format!(
                "  Error saving metadata in '{}': {} ({} file(s) not updated)",
                dir.display(),
                e,
                pending
            )));
        }
    }
}
