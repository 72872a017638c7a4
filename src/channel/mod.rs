//! Command execution against the device.
//!
//! Every reading and every tweak operation goes through a [`CommandChannel`]:
//! a shell command string in, trimmed standard output or a typed failure out.

pub mod scripted;
mod shell;

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use thiserror::Error;

pub use shell::ShellChannel;

/// Errors raised while running a command on the device.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to spawn command: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("command exited with status {code:?}: {stderr}")]
    Failed { code: Option<i32>, stderr: String },

    #[error("command timed out after {0:?}")]
    TimedOut(Duration),
}

impl CommandError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, CommandError::TimedOut(_))
    }
}

/// Runs shell commands and returns their trimmed standard output.
///
/// Implementations must be safe to share between the sampler task and the
/// tweak handlers, so the trait requires `Send + Sync`.
pub trait CommandChannel: Send + Sync {
    fn execute<'a>(&'a self, command: &'a str) -> BoxFuture<'a, Result<String, CommandError>>;
}

pub type SharedChannel = Arc<dyn CommandChannel>;

/// Quotes a single argument for `sh`, escaping embedded single quotes.
pub fn quote_arg(arg: &str) -> String {
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('\'');
    for ch in arg.chars() {
        if ch == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(ch);
        }
    }
    quoted.push('\'');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_plain_argument() {
        assert_eq!(quote_arg("lz4"), "'lz4'");
    }

    #[test]
    fn quote_empty_argument() {
        assert_eq!(quote_arg(""), "''");
    }

    #[test]
    fn quote_embedded_single_quote() {
        assert_eq!(quote_arg("it's"), "'it'\\''s'");
    }

    #[test]
    fn quote_keeps_shell_metacharacters_literal() {
        assert_eq!(quote_arg("$(reboot); echo"), "'$(reboot); echo'");
    }

    #[test]
    fn timeout_error_is_detectable() {
        let err = CommandError::TimedOut(Duration::from_secs(1));
        assert!(err.is_timeout());
        let err = CommandError::Failed {
            code: Some(1),
            stderr: String::new(),
        };
        assert!(!err.is_timeout());
    }
}
