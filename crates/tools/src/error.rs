use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to execute `{program}`: {source}")]
    CommandExecution {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{program}` exited with status {code}: {stderr}")]
    CommandFailed {
        program: String,
        code: i32,
        stderr: String,
    },
    #[error("search options are not valid shell words: {options}")]
    InvalidOptions { options: String },
    #[error("failed to list files under {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

impl Error {
    #[must_use]
    pub fn command_execution(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandExecution {
            program: program.into(),
            source,
        }
    }

    #[must_use]
    pub fn command_failed(program: impl Into<String>, code: i32, stderr: impl Into<String>) -> Self {
        Self::CommandFailed {
            program: program.into(),
            code,
            stderr: stderr.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
