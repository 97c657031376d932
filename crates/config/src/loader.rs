use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    schema::NvpConfig,
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["nvp.toml", "nvp.yaml", "nvp.yml", "nvp.json"];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<NvpConfig> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./nvp.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/nvp/nvp.{toml,yaml,yml,json}` (user-global)
///
/// Returns `NvpConfig::default()` if no config file is found or the one
/// found cannot be parsed.
pub fn discover_and_load() -> NvpConfig {
    let mut dirs = vec![PathBuf::from(".")];
    dirs.extend(config_dir());
    discover_in(&dirs)
}

fn discover_in(dirs: &[PathBuf]) -> NvpConfig {
    if let Some(path) = find_config_file(dirs) {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    NvpConfig::default()
}

fn find_config_file(dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter()
        .flat_map(|dir| CONFIG_FILENAMES.iter().map(move |name| dir.join(name)))
        .find(|p| p.is_file())
}

/// Returns the user-global config directory (`~/.config/nvp/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "nvp").map(|d| d.config_dir().to_path_buf())
}

fn parse_config(raw: &str, path: &Path) -> Result<NvpConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => Err(Error::UnsupportedFormat {
            extension: ext.to_string(),
        }),
    }
}
