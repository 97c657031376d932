//! Project discovery and descriptor management for nvp.
//!
//! A project is a directory holding a `.vim_project` descriptor. The
//! descriptor records the project name, the paths the user has tracked, and
//! options handed verbatim to external tools. Projects are rediscovered by
//! walking upward from any subdirectory, so the root itself is never stored
//! in the file.

pub mod codec;
pub mod complete;
pub mod detect;
pub mod error;
pub mod locator;
pub mod paths;
pub mod registry;
pub mod tracker;
pub mod types;

pub use {
    error::{Error, ErrorKind, Result},
    locator::locate,
    registry::Registry,
    tracker::PathTracker,
    types::{
        CURRENT_SCHEMA_VERSION, DEFAULT_SEARCH_OPTIONS, DESCRIPTOR_FILE_NAME,
        LEGACY_SCHEMA_VERSION, ProjectDescriptor,
    },
};
