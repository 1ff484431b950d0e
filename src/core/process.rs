//! External command execution for the target project.
//!
//! Commands run synchronously through the shell, in the target directory,
//! with no timeout and no retry. A failed spawn or a non-zero exit is
//! captured in the output rather than raised; callers that need to gate on
//! success use `run_checked`.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{CommandFailedDetails, Error, Result};

/// Captured output from a single command invocation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub exit_code: i32,
}

/// Runs shell commands in a fixed working directory.
#[derive(Debug, Clone)]
pub struct Runner {
    dir: PathBuf,
}

impl Runner {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Execute a command through the shell, blocking until completion.
    pub fn run(&self, command: &str) -> CommandOutput {
        #[cfg(windows)]
        let mut cmd = {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", command]);
            cmd
        };

        #[cfg(not(windows))]
        let mut cmd = {
            let mut cmd = Command::new("sh");
            cmd.args(["-c", command]);
            cmd
        };

        cmd.current_dir(&self.dir);

        match cmd.output() {
            Ok(out) => CommandOutput {
                stdout: String::from_utf8_lossy(&out.stdout).to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).to_string(),
                success: out.status.success(),
                exit_code: out.status.code().unwrap_or(-1),
            },
            Err(e) => CommandOutput {
                stdout: String::new(),
                stderr: format!("Command error: {}", e),
                success: false,
                exit_code: -1,
            },
        }
    }

    /// Execute a command and turn a non-zero exit into an error.
    ///
    /// For the steps the orchestrator explicitly gates on (bundle install).
    pub fn run_checked(&self, command: &str) -> Result<CommandOutput> {
        let output = self.run(command);
        if output.success {
            return Ok(output);
        }
        Err(Error::process_command_failed(CommandFailedDetails {
            command: command.to_string(),
            exit_code: output.exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
        }))
    }
}
