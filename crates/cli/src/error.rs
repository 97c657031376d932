use nvp_protocol::{ErrorShape, error_codes};

/// Any failure a command can report back to the host.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Project(#[from] nvp_projects::Error),
    #[error(transparent)]
    Session(#[from] nvp_sessions::Error),
    #[error(transparent)]
    Tool(#[from] nvp_tools::Error),
    #[error("{0}")]
    InvalidRequest(String),
}

impl CommandError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Stable protocol code for this failure.
    pub fn code(&self) -> &'static str {
        use nvp_projects::ErrorKind;

        match self {
            Self::Project(e) => match e.kind() {
                ErrorKind::NotFound => error_codes::NOT_FOUND,
                ErrorKind::AlreadyExists => error_codes::ALREADY_EXISTS,
                ErrorKind::DirectoryNotFound => error_codes::DIRECTORY_NOT_FOUND,
                ErrorKind::Format => error_codes::FORMAT_ERROR,
                ErrorKind::NoActiveProject => error_codes::NO_ACTIVE_PROJECT,
                ErrorKind::Io => error_codes::IO_ERROR,
            },
            Self::Session(_) => error_codes::IO_ERROR,
            Self::Tool(nvp_tools::Error::InvalidOptions { .. }) => error_codes::FORMAT_ERROR,
            Self::Tool(_) => error_codes::TOOL_FAILED,
            Self::InvalidRequest(_) => error_codes::INVALID_REQUEST,
        }
    }

    pub fn to_shape(&self) -> ErrorShape {
        ErrorShape::new(self.code(), self.to_string())
    }
}
