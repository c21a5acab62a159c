//! # Metadata Queries
//!
//! A query is a JSON document such as
//!
//! ```text
//! {"type": "pdf", "size": {"gt": 5000000}, "ageDays": 30, "tags": ["urgent"], "mood": "happy"}
//! ```
//!
//! It is parsed once into a [`Query`]: a flat list of typed [`Predicate`]s that
//! are all AND-ed together. Unknown fields and values of the wrong type are
//! rejected while parsing, so a query that parses can always be evaluated.
//!
//! Evaluation runs against [`FileFacts`], the union of what the filesystem
//! says about a file (size, extension, mtime) and what its directory's sidecar
//! says about it (tags, mood).
//!
//! | Field | Predicate | Semantics |
//! |-------|-----------|-----------|
//! | `type` | `Type` | extension equals value, case-insensitive |
//! | `size.gt` / `size.lt` | `SizeGt` / `SizeLt` | strict byte comparisons; bounds may be negative |
//! | `ageDays` | `OlderThanDays` | `now - mtime > days`, strictly |
//! | `tags` (string) | `HasTag` | tag present |
//! | `tags` (list) | `HasAllTags` | every tag present |
//! | `mood` | `Mood` | mood value equals lowercased query value |
//! | `mood_name` | `MoodName` | mood name equals value, case-sensitive |

use crate::error::{HelperError, Result};
use crate::model::FileAttributes;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Everything a query can ask about one file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileFacts {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    /// Lowercased extension without the dot; empty when there is none.
    pub file_type: String,
    pub last_modified: DateTime<Utc>,
    pub tags: BTreeSet<String>,
    pub mood: Option<String>,
    pub mood_name: Option<String>,
}

impl FileFacts {
    /// Stat `path` and merge in the stored attributes of the file.
    pub fn gather(path: &Path, name: &str, stored: Option<&FileAttributes>) -> Result<Self> {
        let meta = fs::metadata(path).map_err(HelperError::Io)?;
        let modified = meta.modified().map_err(HelperError::Io)?;

        let (tags, mood, mood_name) = match stored {
            Some(attrs) => (
                attrs.tags.clone(),
                attrs.mood.as_ref().map(|m| m.value.clone()),
                attrs.mood.as_ref().and_then(|m| m.name.clone()),
            ),
            None => (BTreeSet::new(), None, None),
        };

        Ok(Self {
            name: name.to_string(),
            path: path.to_path_buf(),
            size: meta.len(),
            file_type: file_type_of(name),
            last_modified: modified.into(),
            tags,
            mood,
            mood_name,
        })
    }
}

/// Lowercased extension of `name` without the dot.
pub fn file_type_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Type(String),
    SizeGt(i64),
    SizeLt(i64),
    OlderThanDays(i64),
    HasTag(String),
    HasAllTags(Vec<String>),
    Mood(String),
    MoodName(String),
}

impl Predicate {
    pub fn matches(&self, facts: &FileFacts, now: DateTime<Utc>) -> bool {
        match self {
            Predicate::Type(ext) => facts.file_type == *ext,
            Predicate::SizeGt(limit) => i128::from(facts.size) > i128::from(*limit),
            Predicate::SizeLt(limit) => i128::from(facts.size) < i128::from(*limit),
            Predicate::OlderThanDays(days) => {
                let age = now.signed_duration_since(facts.last_modified);
                match TimeDelta::try_days(*days) {
                    Some(limit) => age > limit,
                    None => *days < 0,
                }
            }
            Predicate::HasTag(tag) => facts.tags.contains(tag),
            Predicate::HasAllTags(tags) => tags.iter().all(|t| facts.tags.contains(t)),
            Predicate::Mood(value) => facts.mood.as_deref() == Some(value.as_str()),
            Predicate::MoodName(name) => facts.mood_name.as_deref() == Some(name.as_str()),
        }
    }
}

/// A parsed query: all predicates must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    predicates: Vec<Predicate>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawQuery {
    #[serde(rename = "type")]
    file_type: Option<String>,
    size: Option<RawSize>,
    #[serde(rename = "ageDays")]
    age_days: Option<i64>,
    tags: Option<RawTags>,
    mood: Option<String>,
    mood_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSize {
    gt: Option<i64>,
    lt: Option<i64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTags {
    One(String),
    All(Vec<String>),
}

impl Query {
    pub fn new(predicates: Vec<Predicate>) -> Self {
        Self { predicates }
    }

    /// Parse a JSON query document.
    pub fn parse(input: &str) -> Result<Self> {
        let raw: RawQuery = serde_json::from_str(input)
            .map_err(|e| HelperError::MalformedQuery(e.to_string()))?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawQuery) -> Self {
        let mut predicates = Vec::new();

        if let Some(file_type) = raw.file_type {
            predicates.push(Predicate::Type(file_type.to_lowercase()));
        }
        if let Some(size) = raw.size {
            if let Some(gt) = size.gt {
                predicates.push(Predicate::SizeGt(gt));
            }
            if let Some(lt) = size.lt {
                predicates.push(Predicate::SizeLt(lt));
            }
        }
        if let Some(days) = raw.age_days {
            predicates.push(Predicate::OlderThanDays(days));
        }
        match raw.tags {
            Some(RawTags::One(tag)) => predicates.push(Predicate::HasTag(tag)),
            Some(RawTags::All(tags)) => predicates.push(Predicate::HasAllTags(tags)),
            None => {}
        }
        if let Some(mood) = raw.mood {
            predicates.push(Predicate::Mood(mood.to_lowercase()));
        }
        if let Some(name) = raw.mood_name {
            predicates.push(Predicate::MoodName(name));
        }

        Self { predicates }
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn matches(&self, facts: &FileFacts, now: DateTime<Utc>) -> bool {
        self.predicates.iter().all(|p| p.matches(facts, now))
    }
}

impl FromStr for Query {
    type Err = HelperError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
