use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, info};

use crate::{error::Result, host::SessionHost};

/// Reserved name of the snapshot file, sibling to the project descriptor.
pub const SESSION_FILE_NAME: &str = ".vim_project_session";

/// Stores the session snapshot of one project root.
#[derive(Debug, Clone)]
pub struct SessionManager {
    path: PathBuf,
}

impl SessionManager {
    pub fn new(root: &Path) -> Self {
        Self {
            path: root.join(SESSION_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Replace the stored snapshot with `blob`.
    pub fn save(&self, blob: &[u8]) -> Result<()> {
        nvp_common::write_atomic(&self.path, blob)?;
        info!(path = %self.path.display(), bytes = blob.len(), "saved session");
        Ok(())
    }

    /// The stored snapshot, or `None` if none was ever saved.
    pub fn restore(&self) -> Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(blob) => {
                debug!(path = %self.path.display(), bytes = blob.len(), "read session");
                Ok(Some(blob))
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no saved session");
                Ok(None)
            },
            Err(e) => Err(e.into()),
        }
    }

    /// Capture from `host` and save. Nothing is written if capture fails.
    pub fn save_from(&self, host: &dyn SessionHost) -> Result<()> {
        let blob = host.capture()?;
        self.save(&blob)
    }

    /// Hand the stored snapshot to `host`. Returns `false` if there was none.
    pub fn restore_into(&self, host: &dyn SessionHost) -> Result<bool> {
        match self.restore()? {
            Some(blob) => {
                host.apply(&blob)?;
                Ok(true)
            },
            None => Ok(false),
        }
    }
}
