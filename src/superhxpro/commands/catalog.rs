//! Folder map export.
//!
//! Builds a [`Catalog`] of a whole tree, one [`CatalogDir`] per directory keyed
//! by its path relative to the scan root (`"/"` for the root itself), and writes
//! it as a single JSON document. Each file record carries live filesystem facts
//! plus whatever the directory's sidecar stores for that file.

use crate::commands::{CmdMessage, CmdResult};
use crate::error::{HelperError, Result};
use crate::model::{FileAttributes, Mood, DIRECTORY_KEY};
use crate::query::file_type_of;
use crate::store::fs::write_atomic;
use crate::store::SidecarStore;
use crate::walker::{Depth, Walker};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Component, Path};
use tracing::{debug, warn};

pub type Catalog = BTreeMap<String, CatalogDir>;

/// Record keys filled from the filesystem. Stored keys never override them.
const STAT_KEYS: [&str; 5] = ["name", "size", "type", "last_modified", "created"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogDir {
    pub subdirectories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,
    pub files: Vec<CatalogFile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogFile {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub file_type: String,
    pub last_modified: DateTime<Utc>,
    /// `None` where the platform does not record creation time.
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CatalogFile {
    fn from_stat(path: &Path, name: &str, stored: Option<&FileAttributes>) -> std::io::Result<Self> {
        let meta = fs::metadata(path)?;
        let last_modified: DateTime<Utc> = meta.modified()?.into();
        let created = meta.created().ok().map(DateTime::<Utc>::from);

        let mut record = Self {
            name: name.to_string(),
            size: meta.len(),
            file_type: file_type_of(name),
            last_modified,
            created,
            tags: BTreeSet::new(),
            mood: None,
            extra: Map::new(),
        };

        if let Some(attrs) = stored {
            record.tags = attrs.tags.clone();
            record.mood = attrs.mood.clone();
            for (key, value) in &attrs.extra {
                if STAT_KEYS.contains(&key.as_str()) {
                    debug!("Ignoring stored '{}' for '{}'", key, path.display());
                    continue;
                }
                record.extra.insert(key.clone(), value.clone());
            }
        }

        Ok(record)
    }
}

/// Catalog key for a directory `relative` to the scan root.
fn catalog_key(relative: &Path) -> String {
    let parts: Vec<_> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        DIRECTORY_KEY.to_string()
    } else {
        parts.join("/")
    }
}

/// Walk `root` and build its catalog in memory.
pub fn build<S: SidecarStore>(
    store: &S,
    root: &Path,
    follow_links: bool,
) -> Result<(Catalog, CmdResult)> {
    let mut catalog = Catalog::new();
    let mut result = CmdResult::default();

    let issues = Walker::new(store, Depth::Recursive)
        .follow_links(follow_links)
        .walk(root, |visit| {
            let mut entry = CatalogDir {
                subdirectories: visit.subdirs.clone(),
                mood: visit.document.directory_mood().cloned(),
                files: Vec::with_capacity(visit.files.len()),
            };

            for file in &visit.files {
                result.tally.processed += 1;
                match CatalogFile::from_stat(&file.path, &file.name, visit.document.file(&file.name)) {
                    Ok(record) => entry.files.push(record),
                    Err(e) => {
                        warn!("Cannot stat '{}': {}", file.path.display(), e);
                        result.tally.failed += 1;
                        result.add_message(CmdMessage::warning(format!(
                            "  Warning: Could not get info for '{}': {}",
                            file.path.display(),
                            e
                        )));
                    }
                }
            }

            catalog.insert(catalog_key(&visit.relative), entry);
        })?;
    result.add_walk_issues(issues);

    Ok((catalog, result))
}

/// Build the catalog of `root` and write it to `output` in one atomic write.
pub fn export<S: SidecarStore>(
    store: &S,
    root: &Path,
    output: &Path,
    follow_links: bool,
) -> Result<CmdResult> {
    let (catalog, mut result) = build(store, root, follow_links)?;

    let written = serde_json::to_string_pretty(&catalog)
        .map_err(HelperError::from)
        .and_then(|json| write_atomic(output, json.as_bytes()));

    match written {
        Ok(()) => {
            result.tally.updated = catalog.len();
            result.add_message(CmdMessage::success(format!(
                "Folder map exported successfully to '{}'.",
                output.display()
            )));
            Ok(result.with_catalog(catalog))
        }
        Err(e) => {
            result.add_message(CmdMessage::error(format!(
                "Error exporting folder map to '{}': {}",
                output.display(),
                e
            )));
            Ok(result)
        }
    }
}
