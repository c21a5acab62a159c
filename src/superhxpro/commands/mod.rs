//! # Command Layer
//!
//! One module per command. Commands take a [`SidecarStore`](crate::store::SidecarStore)
//! and plain Rust arguments and return a [`CmdResult`]: the structured rows the
//! command produced, a [`Tally`] of what happened, and one [`CmdMessage`] per
//! reported outcome followed by a single summary message.
//!
//! Commands never print. Per-item failures become `Error` or `Warning` messages
//! and the batch continues; only a missing root or an unparsable query ends a
//! command early with an `Err`.

use crate::model::Mood;
use crate::query::FileFacts;
use crate::walker::{Tally, WalkIssue};
use std::path::PathBuf;

pub mod catalog;
pub mod dedupe;
pub mod health;
pub mod mood;
pub mod search;
pub mod tag;

pub use catalog::{Catalog, CatalogDir, CatalogFile};
pub use dedupe::{DedupeMode, Duplicate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// A directory and the mood currently set on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryMood {
    pub dir: PathBuf,
    pub mood: Mood,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub matches: Vec<FileFacts>,
    pub duplicates: Vec<Duplicate>,
    pub moods: Vec<DirectoryMood>,
    pub catalog: Option<Catalog>,
    pub tally: Tally,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Report everything the walker could not read, counting each as a failure.
    pub fn add_walk_issues(&mut self, issues: Vec<WalkIssue>) {
        for issue in issues {
            self.tally.failed += 1;
            self.add_message(CmdMessage::warning(format!(
                "  Skipped '{}': {}",
                issue.path.display(),
                issue.message
            )));
        }
    }

    pub fn has_errors(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.level == MessageLevel::Error)
    }
}
