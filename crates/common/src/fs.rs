use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

/// Sibling temp path used while replacing `path`.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}

/// Replace the contents of `path` atomically via temp file + rename.
///
/// The temp file lives in the same directory as `path` so the rename never
/// crosses a filesystem boundary. On failure the temp file is removed and the
/// previous contents of `path` are left untouched.
pub fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let tmp = temp_path_for(path);

    let result = (|| {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(data)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();

    match result {
        Ok(()) => {
            debug!(path = %path.display(), bytes = data.len(), "wrote file atomically");
            Ok(())
        },
        Err(e) => {
            if let Err(cleanup) = fs::remove_file(&tmp)
                && cleanup.kind() != std::io::ErrorKind::NotFound
            {
                warn!(path = %tmp.display(), error = %cleanup, "failed to remove temp file");
            }
            Err(e)
        },
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomic_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".vim_project");
        write_atomic(&path, b"name: demo\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "name: demo\n");
    }

    #[test]
    fn test_write_atomic_overwrites_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state");
        write_atomic(&path, b"first, and longer").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_write_atomic_missing_parent_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("state");
        assert!(write_atomic(&path, b"x").is_err());
        assert!(!path.exists());
    }
}
