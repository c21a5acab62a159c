//! # Sidecar Data Model
//!
//! Every directory may hold one hidden sidecar document ([`SIDECAR_FILE_NAME`])
//! describing its direct children. On disk it is a JSON object keyed by file
//! name, plus one reserved entry for the directory itself:
//!
//! ```text
//! {
//!     "/": { "mood": { "value": "happy", "name": "Vacation" } },
//!     "report.pdf": { "tags": ["urgent", "work"] },
//!     "photo.jpg": { "tags": ["family"], "rating": 5 }
//! }
//! ```
//!
//! The reserved key is `"/"`: no filesystem accepts it as a bare file name, so it
//! can never shadow a real file. In memory the reserved entry is not a magic
//! string at all; [`EntryKey`] tells the two kinds apart and [`MetadataDocument`]
//! keeps them in separate fields.
//!
//! Documents written by older releases keep the directory entry under
//! [`LEGACY_DIRECTORY_KEY`]. It is read as the directory entry when there is no
//! `"/"` entry, and the next save moves it to `"/"`.
//!
//! Unknown keys inside a record are kept in `extra`, and entries whose values
//! can't be read as attributes at all are kept verbatim in `opaque`. Both are
//! written back untouched, so editing one file never loses another file's data.

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Name of the per-directory sidecar file.
pub const SIDECAR_FILE_NAME: &str = ".superhxpro_metadata.json";

/// On-disk key of the directory-level entry.
pub const DIRECTORY_KEY: &str = "/";

/// Directory entry key used by older releases.
pub const LEGACY_DIRECTORY_KEY: &str = "__folder__";

/// Which entry of a sidecar document a key addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKey<'a> {
    Directory,
    File(&'a str),
}

impl<'a> EntryKey<'a> {
    pub fn from_key(key: &'a str) -> Self {
        if key == DIRECTORY_KEY {
            EntryKey::Directory
        } else {
            EntryKey::File(key)
        }
    }

    pub fn as_key(&self) -> &'a str {
        match self {
            EntryKey::Directory => DIRECTORY_KEY,
            EntryKey::File(name) => name,
        }
    }
}

/// A mood label. Directories carry at most one; files may carry one too when
/// it was written by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mood {
    pub value: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl Mood {
    pub fn new(value: impl Into<String>, name: Option<String>) -> Self {
        Self {
            value: value.into(),
            name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileAttributes {
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FileAttributes {
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.mood.is_none() && self.extra.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectoryAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The parsed contents of one sidecar file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataDocument {
    pub directory: Option<DirectoryAttributes>,
    pub files: BTreeMap<String, FileAttributes>,
    /// Entries whose values are not attribute records. Written back as-is.
    pub opaque: Map<String, Value>,
}

impl MetadataDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.directory.is_none() && self.files.is_empty() && self.opaque.is_empty()
    }

    pub fn file(&self, name: &str) -> Option<&FileAttributes> {
        self.files.get(name)
    }

    /// Current tags of `name`; empty when the file has no entry.
    pub fn tags(&self, name: &str) -> BTreeSet<String> {
        self.files
            .get(name)
            .map(|attrs| attrs.tags.clone())
            .unwrap_or_default()
    }

    /// Replace the tags of `name`. An entry left with no attributes is removed.
    pub fn set_tags(&mut self, name: &str, tags: BTreeSet<String>) {
        let entry = self.file_entry_mut(name);
        entry.tags = tags;
        if entry.is_empty() {
            self.files.remove(name);
        }
    }

    pub fn directory_mood(&self) -> Option<&Mood> {
        self.directory.as_ref().and_then(|dir| dir.mood.as_ref())
    }

    /// Overwrite the directory mood. There is never more than one.
    pub fn set_directory_mood(&mut self, mood: Mood) {
        if self.directory.is_none() && self.opaque.remove(DIRECTORY_KEY).is_some() {
            debug!("Replacing unreadable directory entry");
        }
        self.directory.get_or_insert_with(Default::default).mood = Some(mood);
    }

    fn file_entry_mut(&mut self, name: &str) -> &mut FileAttributes {
        if !self.files.contains_key(name) && self.opaque.remove(name).is_some() {
            debug!("Replacing unreadable metadata entry for '{}'", name);
        }
        self.files.entry(name.to_string()).or_default()
    }
}

impl Serialize for MetadataDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.directory.is_some() as usize + self.files.len() + self.opaque.len();
        let mut map = serializer.serialize_map(Some(len))?;
        if let Some(dir) = &self.directory {
            map.serialize_entry(EntryKey::Directory.as_key(), dir)?;
        }
        for (name, attrs) in &self.files {
            map.serialize_entry(EntryKey::File(name.as_str()).as_key(), attrs)?;
        }
        for (key, value) in &self.opaque {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for MetadataDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        let mut doc = MetadataDocument::new();
        let mut legacy = None;

        for (key, value) in raw {
            if key == LEGACY_DIRECTORY_KEY {
                legacy = Some(value);
                continue;
            }
            match EntryKey::from_key(&key) {
                EntryKey::Directory => {
                    match serde_json::from_value::<DirectoryAttributes>(value.clone()) {
                        Ok(dir) => doc.directory = Some(dir),
                        Err(_) => {
                            doc.opaque.insert(key, value);
                        }
                    }
                }
                EntryKey::File(name) => {
                    match serde_json::from_value::<FileAttributes>(value.clone()) {
                        Ok(attrs) => {
                            doc.files.insert(name.to_string(), attrs);
                        }
                        Err(_) => {
                            doc.opaque.insert(key, value);
                        }
                    }
                }
            }
        }

        if let Some(value) = legacy {
            let has_current = doc.directory.is_some() || doc.opaque.contains_key(DIRECTORY_KEY);
            match serde_json::from_value::<DirectoryAttributes>(value.clone()) {
                Ok(dir) if !has_current => {
                    debug!("Reading legacy '{}' entry as the directory entry", LEGACY_DIRECTORY_KEY);
                    doc.directory = Some(dir);
                }
                _ => {
                    doc.opaque.insert(LEGACY_DIRECTORY_KEY.to_string(), value);
                }
            }
        }

        Ok(doc)
    }
}
