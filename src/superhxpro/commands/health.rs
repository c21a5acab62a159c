//! Tree health check: broken symlinks, unreadable entries, corrupt sidecars and
//! empty files.

use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::SIDECAR_FILE_NAME;
use crate::store::SidecarStore;
use crate::walker::{Depth, Walker};
use std::fs;
use std::path::Path;

pub fn run<S: SidecarStore>(store: &S, root: &Path, follow_links: bool) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let mut issues = 0usize;

    let walk_issues = Walker::new(store, Depth::Recursive)
        .follow_links(follow_links)
        .walk(root, |visit| {
            result.tally.processed += 1;

            if let Some(e) = &visit.load_error {
                issues += 1;
                result.add_message(CmdMessage::error(format!(
                    "  Issue: Unreadable metadata '{}': {}",
                    visit.dir.join(SIDECAR_FILE_NAME).display(),
                    e
                )));
            }

            for file in &visit.files {
                result.tally.processed += 1;

                if file.broken_link {
                    issues += 1;
                    let target = fs::read_link(&file.path)
                        .map(|t| t.display().to_string())
                        .unwrap_or_else(|_| "?".to_string());
                    result.add_message(CmdMessage::error(format!(
                        "  Issue: Broken symlink: '{}' -> '{}'",
                        file.path.display(),
                        target
                    )));
                    continue;
                }

                match fs::metadata(&file.path) {
                    Ok(meta) if meta.len() == 0 => {
                        result.add_message(CmdMessage::warning(format!(
                            "  Warning: Empty file found: '{}'",
                            file.path.display()
                        )));
                    }
                    Ok(_) => {}
                    Err(e) => {
                        issues += 1;
                        result.add_message(CmdMessage::error(format!(
                            "  Issue: Cannot get size of '{}': {}",
                            file.path.display(),
                            e
                        )));
                    }
                }
            }
        })?;

    issues += walk_issues.len();
    result.add_walk_issues(walk_issues);
    result.tally.failed = issues;

    if issues == 0 {
        result.add_message(CmdMessage::success(
            "Health check completed: No significant issues found.",
        ));
    } else {
        result.add_message(CmdMessage::warning(format!(
            "Health check completed: Found {} issue(s).",
            issues
        )));
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::store::fs::FsStore;
    use crate::store::memory::InMemoryStore;
    use tempfile::TempDir;

    #[test]
    fn clean_tree_has_no_issues() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("a.txt"), "a").unwrap();
        let store = InMemoryStore::new();

        let result = run(&store, root.path(), false).unwrap();
        assert_eq!(result.tally.failed, 0);
        assert_eq!(
            result.messages.last().unwrap().content,
            "Health check completed: No significant issues found."
        );
    }

    #[test]
    fn empty_files_warn_but_are_not_issues() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("empty"), "").unwrap();
        let store = InMemoryStore::new();

        let result = run(&store, root.path(), false).unwrap();
        assert_eq!(result.tally.failed, 0);
        assert_eq!(result.messages[0].level, MessageLevel::Warning);
        assert!(result.messages[0].content.contains("Empty file"));
    }

    #[test]
    fn corrupt_sidecar_is_an_issue() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join(SIDECAR_FILE_NAME), "{ broken").unwrap();

        let result = run(&FsStore, root.path(), false).unwrap();
        assert_eq!(result.tally.failed, 1);
        assert!(result.messages[0].content.contains("Unreadable metadata"));
    }

    #[test]
    fn each_sidecar_is_read_once() {
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("sub")).unwrap();
        fs::write(root.path().join("a.txt"), "a").unwrap();
        let store = InMemoryStore::new();
        store.mark_corrupt(root.path());

        let result = run(&store, root.path(), false).unwrap();
        assert_eq!(result.tally.failed, 1);
        assert_eq!(store.read_count(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn broken_symlink_is_an_issue() {
        let root = TempDir::new().unwrap();
        std::os::unix::fs::symlink(root.path().join("gone"), root.path().join("link")).unwrap();
        let store = InMemoryStore::new();

        let result = run(&store, root.path(), false).unwrap();
        assert_eq!(result.tally.failed, 1);
        assert!(result.messages[0].content.contains("Broken symlink"));
        assert_eq!(
            result.messages.last().unwrap().content,
            "Health check completed: Found 1 issue(s)."
        );
    }
}
