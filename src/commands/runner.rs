//! External program execution (make, psql)

use std::path::Path;
use std::process::Stdio;

#[cfg(test)]
use mockall::automock;
use tracing::debug;

use crate::error::ClientError;

/// How the child's standard streams are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Stream output to the user's terminal
    Inherit,
    /// Collect stdout/stderr into the returned [`CommandOutput`]
    Capture,
}

/// Result of a finished program
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` if the program was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn exited(code: i32) -> Self {
        Self {
            code: Some(code),
            ..Self::default()
        }
    }
}

/// Trait for running external programs
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` inside `cwd` and wait for it to exit
    async fn run(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
        mode: OutputMode,
    ) -> Result<CommandOutput, ClientError>;
}

/// Runs programs as child processes of this one
pub struct SystemRunner;

#[async_trait::async_trait]
impl CommandRunner for SystemRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
        mode: OutputMode,
    ) -> Result<CommandOutput, ClientError> {
        debug!("Running {} in {:?}", display_command(program, args), cwd);

        let mut command = tokio::process::Command::new(program);
        command.args(args).current_dir(cwd).stdin(Stdio::null());

        match mode {
            OutputMode::Inherit => {
                let status = command.status().await?;
                Ok(CommandOutput {
                    code: status.code(),
                    ..CommandOutput::default()
                })
            }
            OutputMode::Capture => {
                let output = command.output().await?;
                Ok(CommandOutput {
                    code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                })
            }
        }
    }
}

/// Render a command line for logs and error messages
pub fn display_command(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}
