//! Metadata search over a directory tree.

use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::query::{FileFacts, Predicate, Query};
use crate::store::SidecarStore;
use crate::walker::{Depth, Walker};
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::{debug, warn};

/// Recursively find every file under `root` matching `query`.
pub fn meta<S: SidecarStore>(
    store: &S,
    root: &Path,
    query: &Query,
    follow_links: bool,
) -> Result<CmdResult> {
    let mut result = search(store, root, query, follow_links, Utc::now())?;
    result.add_message(CmdMessage::success(format!(
        "Finished. Found {} file(s) matching criteria.",
        result.tally.matched
    )));
    Ok(result)
}

/// Recursively find every file under `root` carrying `tag`.
pub fn by_tag<S: SidecarStore>(
    store: &S,
    root: &Path,
    tag: &str,
    follow_links: bool,
) -> Result<CmdResult> {
    let query = Query::new(vec![Predicate::HasTag(tag.to_string())]);
    let mut result = search(store, root, &query, follow_links, Utc::now())?;
    result.add_message(CmdMessage::success(format!(
        "Finished. Found {} file(s) with tag '{}'.",
        result.tally.matched, tag
    )));
    Ok(result)
}

/// Walk and evaluate with a fixed `now`, so every file is aged against the
/// same instant.
pub(crate) fn search<S: SidecarStore>(
    store: &S,
    root: &Path,
    query: &Query,
    follow_links: bool,
    now: DateTime<Utc>,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    let issues = Walker::new(store, Depth::Recursive)
        .follow_links(follow_links)
        .walk(root, |visit| {
            for file in &visit.files {
                if file.broken_link {
                    debug!("Skipping broken link '{}'", file.path.display());
                    continue;
                }
                result.tally.processed += 1;

                let facts =
                    match FileFacts::gather(&file.path, &file.name, visit.document.file(&file.name)) {
                        Ok(facts) => facts,
                        Err(e) => {
                            warn!("Cannot read '{}': {}", file.path.display(), e);
                            result.tally.failed += 1;
                            result.add_message(CmdMessage::error(format!(
                                "  Error accessing file '{}': {}",
                                file.path.display(),
                                e
                            )));
                            continue;
                        }
                    };

                if query.matches(&facts, now) {
                    result.tally.matched += 1;
                    result.add_message(CmdMessage::info(describe_match(&facts)));
                    result.matches.push(facts);
                }
            }
        })?;
    result.add_walk_issues(issues);

    Ok(result)
}

fn describe_match(facts: &FileFacts) -> String {
    let tags = if facts.tags.is_empty() {
        "None".to_string()
    } else {
        facts.tags.iter().cloned().collect::<Vec<_>>().join(", ")
    };
    let file_type = if facts.file_type.is_empty() {
        "N/A".to_string()
    } else {
        format!(".{}", facts.file_type)
    };
    format!(
        "  Found: {} (Size: {} bytes, Modified: {}, Type: {}, Tags: {})",
        facts.path.display(),
        facts.size,
        facts.last_modified.format("%Y-%m-%d"),
        file_type,
        tags
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MetadataDocument, SIDECAR_FILE_NAME};
    use crate::store::memory::InMemoryStore;
    use std::collections::BTreeSet;
    use std::fs;
    use tempfile::TempDir;

    fn tags(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn setup() -> (TempDir, InMemoryStore) {
        let root = TempDir::new().unwrap();
        let store = InMemoryStore::new();

        fs::write(root.path().join("big.pdf"), vec![0u8; 2048]).unwrap();
        fs::write(root.path().join("small.pdf"), b"tiny").unwrap();
        fs::write(root.path().join("notes.txt"), b"hello").unwrap();
        fs::write(root.path().join(SIDECAR_FILE_NAME), "{}").unwrap();
        let sub = root.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("deep.pdf"), vec![1u8; 4096]).unwrap();

        let mut doc = MetadataDocument::new();
        doc.set_tags("big.pdf", tags(&["urgent", "work"]));
        doc.set_tags("notes.txt", tags(&["urgent"]));
        store.insert(root.path(), doc);

        let mut sub_doc = MetadataDocument::new();
        sub_doc.set_tags("deep.pdf", tags(&["urgent"]));
        store.insert(&sub, sub_doc);

        (root, store)
    }

    fn names(result: &CmdResult) -> Vec<&str> {
        result.matches.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn combines_size_and_tags() {
        let (root, store) = setup();
        let query = Query::parse(r#"{"size":{"gt":1000},"tags":["urgent"]}"#).unwrap();
        let result = meta(&store, root.path(), &query, false).unwrap();

        assert_eq!(names(&result), ["big.pdf", "deep.pdf"]);
        assert_eq!(result.tally.matched, 2);
    }

    #[test]
    fn missing_tag_in_list_excludes_file() {
        let (root, store) = setup();
        let query = Query::parse(r#"{"tags":["urgent","missing"]}"#).unwrap();
        let result = meta(&store, root.path(), &query, false).unwrap();
        assert!(result.matches.is_empty());
    }

    #[test]
    fn type_filter_is_recursive() {
        let (root, store) = setup();
        let query = Query::parse(r#"{"type":"PDF"}"#).unwrap();
        let result = meta(&store, root.path(), &query, false).unwrap();
        assert_eq!(names(&result), ["big.pdf", "small.pdf", "deep.pdf"]);
    }

    #[test]
    fn by_tag_matches_single_tag() {
        let (root, store) = setup();
        let result = by_tag(&store, root.path(), "work", false).unwrap();
        assert_eq!(names(&result), ["big.pdf"]);
        assert_eq!(
            result.messages.last().unwrap().content,
            "Finished. Found 1 file(s) with tag 'work'."
        );
    }

    #[test]
    fn sidecar_is_never_a_result() {
        let (root, store) = setup();
        let result = meta(&store, root.path(), &Query::default(), false).unwrap();
        assert!(result.matches.iter().all(|f| f.name != SIDECAR_FILE_NAME));
        assert_eq!(result.tally.processed, 4);
    }

    #[test]
    fn age_uses_the_given_now() {
        let (root, store) = setup();
        let query = Query::parse(r#"{"ageDays":1}"#).unwrap();

        let today = search(&store, root.path(), &query, false, Utc::now()).unwrap();
        assert!(today.matches.is_empty());

        let later = Utc::now() + chrono::TimeDelta::days(3);
        let future = search(&store, root.path(), &query, false, later).unwrap();
        assert_eq!(future.matches.len(), 4);
    }

    #[test]
    fn match_message_lists_facts() {
        let (root, store) = setup();
        let query = Query::parse(r#"{"tags":"work"}"#).unwrap();
        let result = meta(&store, root.path(), &query, false).unwrap();
        let line = &result.messages[0].content;

        assert!(line.contains("Found:"));
        assert!(line.contains("Size: 2048 bytes"));
        assert!(line.contains("Type: .pdf"));
        assert!(line.contains("Tags: urgent, work"));
    }
}
