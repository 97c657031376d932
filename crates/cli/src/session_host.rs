use std::{
    fs,
    io::{self, Read, Write},
    path::PathBuf,
};

use nvp_sessions::{
    Result, SessionHost,
    error::{Context, Error},
};

/// Host side of the one-shot session commands: the snapshot comes from (and
/// goes back to) a file, or stdin/stdout when no file is given.
pub struct StdioSessionHost {
    file: Option<PathBuf>,
}

impl StdioSessionHost {
    pub fn new(file: Option<PathBuf>) -> Self {
        Self { file }
    }
}

impl SessionHost for StdioSessionHost {
    fn capture(&self) -> Result<Vec<u8>> {
        match &self.file {
            Some(path) => fs::read(path)
                .with_context(|| format!("failed to read session from {}", path.display())),
            None => {
                let mut blob = Vec::new();
                io::stdin().lock().read_to_end(&mut blob)?;
                Ok(blob)
            },
        }
    }

    fn apply(&self, blob: &[u8]) -> Result<()> {
        match &self.file {
            Some(path) => fs::write(path, blob)
                .with_context(|| format!("failed to write session to {}", path.display())),
            None => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(blob)?;
                stdout.flush().map_err(Error::from)
            },
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, nvp_sessions::SessionManager};

    #[test]
    fn file_host_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.vim");
        let output = dir.path().join("out.vim");
        fs::write(&input, b"edit src/main.rs\n").unwrap();

        let manager = SessionManager::new(dir.path());
        manager.save_from(&StdioSessionHost::new(Some(input))).unwrap();
        assert!(manager.restore_into(&StdioSessionHost::new(Some(output.clone()))).unwrap());
        assert_eq!(fs::read(&output).unwrap(), b"edit src/main.rs\n");
    }

    #[test]
    fn missing_input_file_is_host_error() {
        let dir = tempfile::tempdir().unwrap();
        let host = StdioSessionHost::new(Some(dir.path().join("absent")));
        let err = host.capture().unwrap_err();
        assert!(matches!(err, Error::Host { .. }));
        assert!(err.to_string().contains("absent"));
    }
}
