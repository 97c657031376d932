//! Shared error plumbing and filesystem helpers used across all nvp crates.

pub mod error;
pub mod fs;

pub use {
    error::{Error, FromMessage, Result},
    fs::write_atomic,
};
