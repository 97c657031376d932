//! External tools driven on behalf of the active project.
//!
//! Every tool is launched with an explicit argument vector; user supplied
//! strings are never spliced into a shell command line.

pub mod error;
pub mod exec;
pub mod search;
pub mod tags;
pub mod vcs;

pub use {
    error::{Error, Result},
    exec::{Invocation, ToolOutput},
    search::{SearchOutcome, search, search_invocation},
    tags::{TAGS_FILE_NAME, TagsReport, generate_tags},
    vcs::{run_vcs, vcs_invocation},
};
