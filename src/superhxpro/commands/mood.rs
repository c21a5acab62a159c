//! Directory moods: a single `{value, name}` label per directory, stored under
//! the sidecar's directory entry.

use crate::commands::{CmdMessage, CmdResult, DirectoryMood};
use crate::error::{HelperError, Result};
use crate::model::Mood;
use crate::store::SidecarStore;
use crate::walker::{ensure_directory, Depth, Walker};
use std::path::Path;

/// Set the mood of `dir`, replacing any previous one.
///
/// Always writes, even when the mood is unchanged.
pub fn set<S: SidecarStore>(
    store: &S,
    dir: &Path,
    value: &str,
    name: Option<&str>,
) -> Result<CmdResult> {
    ensure_directory(dir)?;
    let value = value.trim();
    if value.is_empty() {
        return Err(HelperError::InvalidArgument(
            "Mood value cannot be empty".to_string(),
        ));
    }
    let name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    let mut result = CmdResult::default();
    let mut doc = store.load(dir);
    let mood = Mood::new(value, name);
    doc.set_directory_mood(mood.clone());

    match store.save(dir, &doc) {
        Ok(()) => {
            result.tally.updated = 1;
            result.add_message(CmdMessage::success(format!(
                "Mood '{}' ({}) set for folder '{}'.",
                mood.value,
                mood.name.as_deref().unwrap_or("No name"),
                dir.display()
            )));
            result.moods.push(DirectoryMood {
                dir: dir.to_path_buf(),
                mood,
            });
        }
        Err(e) => {
            result.tally.failed = 1;
            result.add_message(CmdMessage::error(format!(
                "Error saving mood for folder '{}': {}",
                dir.display(),
                e
            )));
        }
    }

    Ok(result)
}

/// Report moods under `dir`.
///
/// Without a filter and without recursion this reports `dir` alone. Otherwise
/// every visited directory is checked and those whose mood value or name
/// contains `filter` (ignoring case) are listed.
pub fn get<S: SidecarStore>(
    store: &S,
    dir: &Path,
    recursive: bool,
    filter: Option<&str>,
    follow_links: bool,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    if !recursive && filter.is_none() {
        ensure_directory(dir)?;
        match store.load(dir).directory_mood() {
            Some(mood) => {
                result.add_message(CmdMessage::info(format!(
                    "{} - {}",
                    dir.display(),
                    mood.value
                )));
                result.moods.push(DirectoryMood {
                    dir: dir.to_path_buf(),
                    mood: mood.clone(),
                });
            }
            None => {
                result.add_message(CmdMessage::info(format!(
                    "No mood set for folder '{}'.",
                    dir.display()
                )));
            }
        }
        return Ok(result);
    }

    let needle = filter.map(str::to_lowercase);
    let mut found = Vec::new();
    let issues = Walker::new(store, Depth::from_recursive(recursive))
        .follow_links(follow_links)
        .walk(dir, |visit| {
            result.tally.processed += 1;
            if let Some(mood) = visit.document.directory_mood() {
                if mood_matches(mood, needle.as_deref()) {
                    found.push(DirectoryMood {
                        dir: visit.dir.clone(),
                        mood: mood.clone(),
                    });
                }
            }
        })?;
    result.add_walk_issues(issues);

    if found.is_empty() {
        result.add_message(CmdMessage::info(
            "No matching moods found for the specified criteria.",
        ));
    }
    for entry in &found {
        result.add_message(CmdMessage::info(format!(
            "{} - {}",
            entry.dir.display(),
            entry.mood.value
        )));
    }
    result.tally.matched = found.len();
    result.moods = found;

    Ok(result)
}

/// `needle` must already be lowercased.
fn mood_matches(mood: &Mood, needle: Option<&str>) -> bool {
    let Some(needle) = needle else {
        return true;
    };
    mood.value.to_lowercase().contains(needle)
        || mood
            .name
            .as_deref()
            .is_some_and(|name| name.to_lowercase().contains(needle))
}
