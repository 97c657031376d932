use {nvp_common::FromMessage, thiserror::Error};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The host failed to capture or apply a snapshot.
    #[error("{message}")]
    Host { message: String },
}

impl Error {
    #[must_use]
    pub fn host(message: impl Into<String>) -> Self {
        Self::Host {
            message: message.into(),
        }
    }
}

impl FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Host { message }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

nvp_common::impl_context!();
