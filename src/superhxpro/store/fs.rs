use super::SidecarStore;
use crate::error::{HelperError, Result};
use crate::model::{MetadataDocument, SIDECAR_FILE_NAME};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

/// Filesystem-backed sidecar store.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl FsStore {
    pub fn new() -> Self {
        Self
    }

    pub fn sidecar_path(dir: &Path) -> PathBuf {
        dir.join(SIDECAR_FILE_NAME)
    }
}

impl SidecarStore for FsStore {
    fn read(&self, dir: &Path) -> Result<Option<MetadataDocument>> {
        let path = Self::sidecar_path(dir);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(HelperError::Io(e)),
        };

        if content.trim().is_empty() {
            info!("Metadata file '{}' is empty", path.display());
            return Ok(None);
        }

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| HelperError::CorruptMetadata {
                path,
                reason: e.to_string(),
            })
    }

    fn write(&self, dir: &Path, doc: &MetadataDocument) -> Result<()> {
        fs::create_dir_all(dir).map_err(HelperError::Io)?;
        let content = serde_json::to_string_pretty(doc).map_err(HelperError::Serialization)?;
        write_atomic(&Self::sidecar_path(dir), content.as_bytes())?;
        debug!("Saved metadata for '{}'", dir.display());
        Ok(())
    }
}

/// Write `bytes` to `target` through a temp file in the same directory, so
/// readers see either the old content or the new one, never a mix.
pub fn write_atomic(target: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = parent.join(format!(".{}-{}.tmp", file_name, Uuid::new_v4()));

    if let Err(e) = fs::write(&tmp_path, bytes) {
        let _ = fs::remove_file(&tmp_path);
        return Err(HelperError::Io(e));
    }
    if let Err(e) = fs::rename(&tmp_path, target) {
        let _ = fs::remove_file(&tmp_path);
        return Err(HelperError::Io(e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Mood;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    #[test]
    fn missing_sidecar_reads_as_none() {
        let dir = TempDir::new().unwrap();
        assert!(FsStore.read(dir.path()).unwrap().is_none());
        assert!(FsStore.load(dir.path()).is_empty());
    }

    #[test]
    fn whitespace_only_sidecar_is_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(FsStore::sidecar_path(dir.path()), "  \n").unwrap();
        assert!(FsStore.read(dir.path()).unwrap().is_none());
    }

    #[test]
    fn corrupt_sidecar_is_an_error_for_read_but_empty_for_load() {
        let dir = TempDir::new().unwrap();
        fs::write(FsStore::sidecar_path(dir.path()), "{ not json").unwrap();

        assert!(matches!(
            FsStore.read(dir.path()),
            Err(HelperError::CorruptMetadata { .. })
        ));
        assert_eq!(FsStore.load(dir.path()), MetadataDocument::new());
    }

    #[test]
    fn non_object_sidecar_is_corrupt() {
        let dir = TempDir::new().unwrap();
        fs::write(FsStore::sidecar_path(dir.path()), "[1, 2, 3]").unwrap();
        assert!(FsStore.load(dir.path()).is_empty());
    }

    #[test]
    fn save_creates_missing_directory() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("nested").join("deeper");

        let mut doc = MetadataDocument::new();
        doc.set_directory_mood(Mood::new("happy", None));
        FsStore.save(&dir, &doc).unwrap();

        assert!(FsStore::sidecar_path(&dir).exists());
        assert_eq!(FsStore.load(&dir), doc);
    }

    #[test]
    fn save_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let mut doc = MetadataDocument::new();
        doc.set_tags("a.txt", BTreeSet::from(["x".to_string()]));
        FsStore.save(dir.path(), &doc).unwrap();

        for entry in fs::read_dir(dir.path()).unwrap() {
            let name = entry.unwrap().file_name().to_string_lossy().into_owned();
            assert!(!name.ends_with(".tmp"), "Found leftover tmp file: {}", name);
        }
    }

    #[test]
    fn sidecar_is_pretty_printed() {
        let dir = TempDir::new().unwrap();
        let mut doc = MetadataDocument::new();
        doc.set_tags("a.txt", BTreeSet::from(["x".to_string()]));
        FsStore.save(dir.path(), &doc).unwrap();

        let on_disk = fs::read_to_string(FsStore::sidecar_path(dir.path())).unwrap();
        assert!(on_disk.contains('\n'));
    }

    #[cfg(unix)]
    #[test]
    fn failed_write_keeps_previous_content() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let mut doc = MetadataDocument::new();
        doc.set_tags("a.txt", BTreeSet::from(["old".to_string()]));
        FsStore.save(dir.path(), &doc).unwrap();
        let before = fs::read_to_string(FsStore::sidecar_path(dir.path())).unwrap();

        fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o555)).unwrap();
        let probe = dir.path().join("probe");
        let writable = fs::write(&probe, "x").is_ok();
        let _ = fs::remove_file(&probe);

        if !writable {
            doc.set_tags("a.txt", BTreeSet::from(["new".to_string()]));
            assert!(FsStore.save(dir.path(), &doc).is_err());
            let after = fs::read_to_string(FsStore::sidecar_path(dir.path())).unwrap();
            assert_eq!(before, after);
        }

        fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o755)).unwrap();
    }
}
