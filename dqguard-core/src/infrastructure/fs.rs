// dqguard-core/src/infrastructure/fs.rs

use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::infrastructure::error::InfrastructureError;

/// A fully written, synced sibling of `target`. Dropping it before
/// [`StagedWrite::commit`] removes the temporary file and leaves the target
/// untouched.
pub struct StagedWrite {
    file: tempfile::NamedTempFile,
    target: PathBuf,
}

impl StagedWrite {
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Renames the staged file over the target.
    pub fn commit(self) -> Result<(), InfrastructureError> {
        self.file
            .persist(&self.target)
            .map_err(|e| InfrastructureError::Io(e.error))?;
        Ok(())
    }
}

/// Writes and syncs `content` next to `path` without touching `path`.
pub fn stage<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<StagedWrite, InfrastructureError> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    // Same directory as the target, so the rename never crosses filesystems
    let mut file = tempfile::NamedTempFile::new_in(parent)?;
    file.write_all(content.as_ref())?;
    file.as_file().sync_all()?;

    Ok(StagedWrite {
        file,
        target: path.to_path_buf(),
    })
}

/// Replaces `path` with `content` in one step: the bytes go to a sibling
/// temporary file which is then renamed over the target. Readers see either
/// the old file or the new one, never a prefix of it.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    stage(path, content)?.commit()
}

/// Pretty JSON through [`atomic_write`].
pub fn write_json_atomic<P: AsRef<Path>, T: Serialize>(
    path: P,
    value: &T,
) -> Result<(), InfrastructureError> {
    let mut body = serde_json::to_vec_pretty(value)?;
    body.push(b'\n');
    atomic_write(path, body)
}

/// CSV files under `dir`, sorted by path. A missing directory yields nothing.
pub fn discover_inputs(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        return Vec::new();
    }
    let mut found: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    found.sort();
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write_creates_parents() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("dq").join("baselines.json");

        atomic_write(&file_path, "{\"history\": []}")?;

        assert_eq!(fs::read_to_string(file_path)?, "{\"history\": []}");
        Ok(())
    }

    #[test]
    fn test_atomic_write_overwrites_existing() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("rules.json");

        atomic_write(&file_path, "old")?;
        atomic_write(&file_path, "new")?;

        assert_eq!(fs::read_to_string(file_path)?, "new");
        Ok(())
    }

    #[test]
    fn test_crash_before_rename_keeps_previous_content() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("baselines.json");
        atomic_write(&file_path, "{\"history\": [1]}")?;

        // Interrupted between staging and the rename
        let staged = stage(&file_path, "{\"history\": [1, 2]}")?;
        assert_eq!(staged.target(), file_path.as_path());
        assert_eq!(fs::read_dir(dir.path())?.count(), 2);
        assert_eq!(fs::read_to_string(&file_path)?, "{\"history\": [1]}");
        drop(staged);

        assert_eq!(fs::read_to_string(&file_path)?, "{\"history\": [1]}");
        assert_eq!(fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }

    #[test]
    fn test_commit_replaces_target() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("rules.json");
        atomic_write(&file_path, "old")?;

        stage(&file_path, "new")?.commit()?;

        assert_eq!(fs::read_to_string(&file_path)?, "new");
        assert_eq!(fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }

    #[test]
    fn test_discover_inputs_only_csv_sorted() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join("raw"))?;
        fs::write(dir.path().join("raw").join("b.csv"), "a\n1\n")?;
        fs::write(dir.path().join("a.CSV"), "a\n1\n")?;
        fs::write(dir.path().join("notes.txt"), "x")?;

        let found = discover_inputs(dir.path());
        assert_eq!(found.len(), 2);
        assert!(found[0].ends_with("a.CSV"));
        assert!(found[1].ends_with("raw/b.csv"));

        assert!(discover_inputs(&dir.path().join("nope")).is_empty());
        Ok(())
    }
}
