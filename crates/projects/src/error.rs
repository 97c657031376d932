use std::{fmt, path::PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no project descriptor found from {start} upward")]
    NotFound { start: PathBuf },
    #[error("a project already exists in {path}")]
    AlreadyExists { path: PathBuf },
    #[error("directory {path} does not exist")]
    DirectoryNotFound { path: PathBuf },
    #[error("invalid project descriptor: {reason}")]
    Format { reason: String },
    #[error("no project is open")]
    NoActiveProject,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Stable identity of a failure, shared by return values and log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    DirectoryNotFound,
    Format,
    NoActiveProject,
    Io,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::AlreadyExists => "already_exists",
            Self::DirectoryNotFound => "directory_not_found",
            Self::Format => "format",
            Self::NoActiveProject => "no_active_project",
            Self::Io => "io",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    #[must_use]
    pub fn format(reason: impl Into<String>) -> Self {
        Self::Format {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::DirectoryNotFound { .. } => ErrorKind::DirectoryNotFound,
            Self::Format { .. } => ErrorKind::Format,
            Self::NoActiveProject => ErrorKind::NoActiveProject,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
