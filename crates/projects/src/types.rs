use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Deserializer, Serialize};

/// Reserved name of the descriptor file inside a project root.
pub const DESCRIPTOR_FILE_NAME: &str = ".vim_project";

/// Descriptor format written by this version.
pub const CURRENT_SCHEMA_VERSION: &str = "1.0.0";

/// Version assumed for descriptors that predate `schema_version`.
pub const LEGACY_SCHEMA_VERSION: &str = "0.0.0";

/// Options handed to the search tool when a descriptor does not set any.
pub const DEFAULT_SEARCH_OPTIONS: &str =
    "--ignore-file=is:tags --ignore-file=ext:map --ignore-file=ext:d";

fn legacy_schema_version() -> String {
    LEGACY_SCHEMA_VERSION.to_string()
}

fn default_open_browsers() -> bool {
    true
}

fn default_search_options() -> String {
    DEFAULT_SEARCH_OPTIONS.to_string()
}

// An explicit `key: ~` reads the same as a missing key.

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

fn schema_version_or_legacy<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::deserialize(d)?.unwrap_or_else(legacy_schema_version))
}

fn open_browsers_or_default<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(Option::deserialize(d)?.unwrap_or_else(default_open_browsers))
}

fn search_options_or_default<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::deserialize(d)?.unwrap_or_else(default_search_options))
}

/// Numeric `major.minor.patch`; missing parts count as zero. `None` for
/// anything else, such as pre-release tags.
fn parse_version(version: &str) -> Option<[u64; 3]> {
    let mut parsed = [0u64; 3];
    let mut parts = version.trim().split('.');
    for slot in &mut parsed {
        match parts.next() {
            Some(part) => *slot = part.parse().ok()?,
            None => break,
        }
    }
    parts.next().is_none().then_some(parsed)
}

/// The persisted description of one project.
///
/// `root` is derived from where the descriptor was found and is never written
/// back; any root-like key in an old file is dropped on decode. Other keys
/// this version does not know are kept in `extra` and written back as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDescriptor {
    #[serde(
        default = "legacy_schema_version",
        deserialize_with = "schema_version_or_legacy"
    )]
    pub schema_version: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(skip)]
    pub root: PathBuf,
    #[serde(default, deserialize_with = "null_as_default")]
    pub paths: Vec<PathBuf>,
    #[serde(
        default = "default_open_browsers",
        deserialize_with = "open_browsers_or_default"
    )]
    pub open_browsers: bool,
    #[serde(
        default = "default_search_options",
        deserialize_with = "search_options_or_default",
        alias = "ack_options"
    )]
    pub search_options: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_options: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl ProjectDescriptor {
    /// A fresh descriptor at the current schema version with default options.
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION.to_string(),
            name: name.into(),
            root: root.into(),
            paths: Vec::new(),
            open_browsers: default_open_browsers(),
            search_options: default_search_options(),
            build_options: None,
            extra: BTreeMap::new(),
        }
    }

    /// Location of the descriptor file for this project.
    pub fn descriptor_path(&self) -> PathBuf {
        descriptor_path_in(&self.root)
    }

    /// Older than [`CURRENT_SCHEMA_VERSION`]; `persist` upgrades these.
    /// Newer or unparsable versions are left alone.
    pub fn is_legacy(&self) -> bool {
        match (
            parse_version(&self.schema_version),
            parse_version(CURRENT_SCHEMA_VERSION),
        ) {
            (Some(found), Some(current)) => found < current,
            _ => false,
        }
    }
}

/// Location of the descriptor file inside `dir`.
pub fn descriptor_path_in(dir: &Path) -> PathBuf {
    dir.join(DESCRIPTOR_FILE_NAME)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case::missing_field("0.0.0", true)]
    #[case::older_minor("0.9.3", true)]
    #[case::short_form("0.9", true)]
    #[case::current("1.0.0", false)]
    #[case::newer_patch("1.0.1", false)]
    #[case::newer_major("2.0.0", false)]
    #[case::numeric_not_lexical("10.0.0", false)]
    #[case::prerelease("2.0.0-beta", false)]
    #[case::garbage("next", false)]
    fn test_is_legacy(#[case] version: &str, #[case] legacy: bool) {
        let mut d = ProjectDescriptor::new("demo", "/tmp/proj");
        d.schema_version = version.to_string();
        assert_eq!(d.is_legacy(), legacy);
    }
}
