//! Configuration for the external tools nvp drives.
//!
//! Config files: `nvp.toml`, `nvp.yaml`, or `nvp.json`
//! Searched in `./` then `~/.config/nvp/`.
//!
//! Only tool settings live here. The descriptor and session filenames and
//! the default search options are fixed so every invocation agrees on them.

pub mod error;
pub mod loader;
pub mod schema;

pub use {
    error::{Error, Result},
    loader::{config_dir, discover_and_load, load_config},
    schema::{NvpConfig, SessionConfig, ToolCommand, ToolsConfig},
};
