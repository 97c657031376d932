//! Session snapshot storage.
//!
//! A snapshot is an opaque blob describing which files and windows the host
//! had open. It lives next to the project descriptor as
//! `<root>/.vim_project_session`, one per project, replaced on every save.
//! The host decides what goes in the blob through [`SessionHost`].

pub mod error;
pub mod host;
pub mod snapshot;

pub use {
    error::{Error, Result},
    host::SessionHost,
    snapshot::{SESSION_FILE_NAME, SessionManager},
};
