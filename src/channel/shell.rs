use std::process::Stdio;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::process::Command;

use super::{CommandChannel, CommandError};
use crate::config::BackendConfig;

/// Runs commands through a local shell, e.g. `sh -c <command>` or
/// `su -c <command>` on a rooted device.
#[derive(Debug, Clone)]
pub struct ShellChannel {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ShellChannel {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    pub fn from_config(backend: &BackendConfig) -> Self {
        Self::new(
            backend.program.clone(),
            backend.args.clone(),
            Duration::from_millis(backend.command_timeout_ms),
        )
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn run(&self, command: &str) -> Result<String, CommandError> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| CommandError::TimedOut(self.timeout))??;

        if !output.status.success() {
            return Err(CommandError::Failed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl CommandChannel for ShellChannel {
    fn execute<'a>(&'a self, command: &'a str) -> BoxFuture<'a, Result<String, CommandError>> {
        self.run(command).boxed()
    }
}
