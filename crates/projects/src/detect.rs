use std::{fs, path::Path};

use tracing::debug;

/// Name used when nothing else yields one.
pub const FALLBACK_NAME: &str = "project";

/// Derive a project name from a directory.
///
/// Resolution order:
/// 1. `Cargo.toml` package name
/// 2. `package.json` name
/// 3. Directory name
/// 4. [`FALLBACK_NAME`], for directories without one such as `/`
pub fn derive_name(dir: &Path) -> String {
    let name = cargo_name(dir)
        .or_else(|| package_json_name(dir))
        .or_else(|| {
            dir.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .filter(|n| !n.is_empty())
        })
        .unwrap_or_else(|| FALLBACK_NAME.to_string());
    debug!(dir = %dir.display(), name = %name, "derived project name");
    name
}

fn cargo_name(dir: &Path) -> Option<String> {
    let content = fs::read_to_string(dir.join("Cargo.toml")).ok()?;
    let table: toml::Table = toml::from_str(&content).ok()?;
    table
        .get("package")?
        .get("name")?
        .as_str()
        .filter(|n| !n.is_empty())
        .map(String::from)
}

fn package_json_name(dir: &Path) -> Option<String> {
    let content = fs::read_to_string(dir.join("package.json")).ok()?;
    let val: serde_json::Value = serde_json::from_str(&content).ok()?;
    val.get("name")?
        .as_str()
        .filter(|n| !n.is_empty())
        .map(String::from)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_name_cargo() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("Cargo.toml"),
            "[package]\nname = \"my-crate\"\nversion = \"0.1.0\"\n",
        )
        .unwrap();
        fs::write(dir.path().join("package.json"), r#"{"name": "ignored"}"#).unwrap();
        assert_eq!(derive_name(dir.path()), "my-crate");
    }

    #[test]
    fn test_derive_name_workspace_manifest_falls_through() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Cargo.toml"), "[workspace]\nmembers = []\n").unwrap();
        fs::write(dir.path().join("package.json"), r#"{"name": "web-app"}"#).unwrap();
        assert_eq!(derive_name(dir.path()), "web-app");
    }

    #[test]
    fn test_derive_name_fallback_to_dir_name() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("plain-dir");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("package.json"), "{ not json").unwrap();
        assert_eq!(derive_name(&root), "plain-dir");
    }

    #[test]
    fn test_derive_name_filesystem_root() {
        assert_eq!(derive_name(Path::new("/")), FALLBACK_NAME);
    }
}
