use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::Stdio,
};

use {
    nvp_config::ToolCommand,
    serde::Serialize,
    tokio::{io::AsyncWriteExt, process::Command},
    tracing::debug,
};

use crate::error::{Error, Result};

/// Captured result of a finished tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// A program and its argument vector, built up one argument at a time.
#[derive(Debug, Clone)]
pub struct Invocation {
    program: String,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    /// Start from a configured tool, including its configured extra args.
    pub fn from_tool(tool: &ToolCommand) -> Self {
        Self::new(&tool.program).args(&tool.args)
    }

    #[must_use]
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    #[must_use]
    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.current_dir = Some(dir.to_path_buf());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn argv(&self) -> &[OsString] {
        &self.args
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd
    }

    /// Run to completion, optionally feeding `input` on stdin.
    ///
    /// A non-zero exit is reported in [`ToolOutput::code`], not as an error;
    /// only failing to launch the program is an error here.
    pub async fn output(&self, input: Option<Vec<u8>>) -> Result<ToolOutput> {
        let mut cmd = self.command();
        cmd.stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });

        debug!(program = %self.program, args = ?self.args, "running tool");
        let mut child = cmd
            .spawn()
            .map_err(|e| Error::command_execution(&self.program, e))?;

        if let (Some(input), Some(mut stdin)) = (input, child.stdin.take()) {
            // Write concurrently with draining stdout so a chatty tool cannot
            // fill its pipe and stall us.
            let program = self.program.clone();
            tokio::spawn(async move {
                if let Err(e) = stdin.write_all(&input).await {
                    debug!(program = %program, error = %e, "tool closed stdin early");
                }
            });
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| Error::command_execution(&self.program, e))?;

        let result = ToolOutput {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(program = %self.program, code = result.code, "tool finished");
        Ok(result)
    }

    /// Like [`Invocation::output`], but a non-zero exit becomes
    /// [`Error::CommandFailed`].
    pub async fn checked_output(&self, input: Option<Vec<u8>>) -> Result<ToolOutput> {
        let output = self.output(input).await?;
        if !output.success() {
            return Err(Error::command_failed(
                &self.program,
                output.code,
                output.stderr.trim(),
            ));
        }
        Ok(output)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tool_keeps_configured_args_first() {
        let tool = ToolCommand {
            program: "ack".into(),
            args: vec!["--nocolor".into()],
        };
        let inv = Invocation::from_tool(&tool).arg("needle");
        assert_eq!(inv.program(), "ack");
        assert_eq!(inv.argv(), [OsString::from("--nocolor"), OsString::from("needle")]);
    }

    #[test]
    fn test_args_are_not_split() {
        let inv = Invocation::new("echo").arg("two words; rm -rf /");
        assert_eq!(inv.argv().len(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_output_captures_stdout_and_stdin() {
        let out = Invocation::new("cat")
            .output(Some(b"hello\n".to_vec()))
            .await
            .unwrap();
        assert!(out.success());
        assert_eq!(out.stdout, "hello\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_checked_output_reports_exit_code() {
        let err = Invocation::new("sh")
            .args(["-c", "echo nope >&2; exit 3"])
            .checked_output(None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::CommandFailed { code: 3, ref stderr, .. } if stderr == "nope"
        ));
    }

    #[tokio::test]
    async fn test_missing_program_is_execution_error() {
        let err = Invocation::new("nvp-definitely-not-installed")
            .output(None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CommandExecution { .. }));
    }
}
