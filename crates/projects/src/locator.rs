use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{
    error::{Error, Result},
    paths::absolutize,
    types::descriptor_path_in,
};

/// Find the nearest directory at or above `start_dir` holding a descriptor.
///
/// Checks `start_dir` itself first, then each parent in turn. The walk ends
/// at the filesystem root, where a directory has no parent.
pub fn locate(start_dir: &Path) -> Result<PathBuf> {
    let start = absolutize(start_dir)?;

    let mut current = Some(start.as_path());
    while let Some(dir) = current {
        let candidate = descriptor_path_in(dir);
        if candidate.is_file() {
            debug!(root = %dir.display(), "found project descriptor");
            return Ok(dir.to_path_buf());
        }
        current = dir.parent();
    }

    debug!(start = %start.display(), kind = "not_found", "no project descriptor above start");
    Err(Error::NotFound { start })
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{error::ErrorKind, types::DESCRIPTOR_FILE_NAME},
        std::fs,
    };

    fn touch_descriptor(dir: &Path) {
        fs::write(dir.join(DESCRIPTOR_FILE_NAME), "name: t\n").unwrap();
    }

    #[test]
    fn test_locate_in_start_dir() {
        let dir = tempfile::tempdir().unwrap();
        touch_descriptor(dir.path());
        assert_eq!(locate(dir.path()).unwrap(), dir.path());
    }

    #[test]
    fn test_locate_from_descendant() {
        let dir = tempfile::tempdir().unwrap();
        touch_descriptor(dir.path());
        let deep = dir.path().join("src").join("deep").join("deeper");
        fs::create_dir_all(&deep).unwrap();
        assert_eq!(locate(&deep).unwrap(), dir.path());
    }

    #[test]
    fn test_locate_stops_at_nearest_nested_project() {
        let dir = tempfile::tempdir().unwrap();
        touch_descriptor(dir.path());
        let nested = dir.path().join("vendor").join("lib");
        let below = nested.join("src");
        fs::create_dir_all(&below).unwrap();
        touch_descriptor(&nested);

        assert_eq!(locate(&below).unwrap(), nested);
        assert_eq!(locate(&dir.path().join("vendor")).unwrap(), dir.path());
    }

    #[test]
    fn test_locate_ignores_descriptor_directory() {
        let dir = tempfile::tempdir().unwrap();
        let inner = dir.path().join("inner");
        fs::create_dir_all(inner.join(DESCRIPTOR_FILE_NAME)).unwrap();
        touch_descriptor(dir.path());
        assert_eq!(locate(&inner).unwrap(), dir.path());
    }

    #[test]
    fn test_locate_not_found_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("a").join("b");
        fs::create_dir_all(&sub).unwrap();
        // An ancestor of the temp dir may hold a descriptor on a dev machine;
        // only assert when the walk really reaches the root.
        if let Err(err) = locate(&sub) {
            assert_eq!(err.kind(), ErrorKind::NotFound);
            assert!(matches!(locate(&sub), Err(Error::NotFound { start }) if start == sub));
        }
    }

    #[test]
    fn test_locate_at_filesystem_root_terminates() {
        let root = Path::new("/");
        // Terminates either way; a descriptor at `/` would be found.
        match locate(root) {
            Ok(found) => assert_eq!(found, root),
            Err(err) => assert_eq!(err.kind(), ErrorKind::NotFound),
        }
    }
}
