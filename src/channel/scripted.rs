//! A scripted [`CommandChannel`] that answers by command substring.
//!
//! Used by the test suites to drive the collector, the sampler and the tweak
//! engine without a device.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;

use super::{CommandChannel, CommandError};

#[derive(Debug, Clone)]
enum Reply {
    Output(String),
    Fail,
}

#[derive(Debug, Clone)]
struct Rule {
    needle: String,
    reply: Reply,
}

/// Rules added later take precedence over earlier ones, so a test can change
/// what the "device" reports halfway through.
#[derive(Debug, Default)]
pub struct ScriptedChannel {
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<Vec<String>>,
    delay: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every command containing `needle` with `output`.
    pub fn respond(&self, needle: &str, output: &str) -> &Self {
        lock(&self.rules).push(Rule {
            needle: needle.to_string(),
            reply: Reply::Output(output.to_string()),
        });
        self
    }

    /// Fail every command containing `needle` with a non-zero exit.
    pub fn fail(&self, needle: &str) -> &Self {
        lock(&self.rules).push(Rule {
            needle: needle.to_string(),
            reply: Reply::Fail,
        });
        self
    }

    /// Delay every reply, simulating a slow device.
    pub fn set_delay(&self, delay: Duration) {
        *lock(&self.delay) = Some(delay);
    }

    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self, needle: &str) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|call| call.contains(needle))
            .count()
    }

    /// Highest number of commands that were outstanding at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn lookup(&self, command: &str) -> Option<Reply> {
        lock(&self.rules)
            .iter()
            .rev()
            .find(|rule| command.contains(&rule.needle))
            .map(|rule| rule.reply.clone())
    }

    async fn run(&self, command: &str) -> Result<String, CommandError> {
        lock(&self.calls).push(command.to_string());
        let reply = self.lookup(command);
        let delay = *lock(&self.delay);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match reply {
            Some(Reply::Output(output)) => Ok(output.trim().to_string()),
            Some(Reply::Fail) => Err(CommandError::Failed {
                code: Some(1),
                stderr: "scripted failure".to_string(),
            }),
            None => Err(CommandError::Failed {
                code: Some(127),
                stderr: format!("no scripted reply for: {command}"),
            }),
        }
    }
}

impl CommandChannel for ScriptedChannel {
    fn execute<'a>(&'a self, command: &'a str) -> BoxFuture<'a, Result<String, CommandError>> {
        self.run(command).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn later_rules_override_earlier_ones() {
        let channel = ScriptedChannel::new();
        channel.respond("get_current", "mode=1");
        channel.respond("get_current", "mode=3");
        let out = channel.execute("sh thermal.sh get_current").await.unwrap();
        assert_eq!(out, "mode=3");
    }

    #[tokio::test]
    async fn unmatched_command_fails() {
        let channel = ScriptedChannel::new();
        let err = channel.execute("cat /proc/meminfo").await.unwrap_err();
        assert!(matches!(err, CommandError::Failed { code: Some(127), .. }));
    }

    #[tokio::test]
    async fn records_calls() {
        let channel = ScriptedChannel::new();
        channel.respond("echo", "hi").fail("false");
        let _ = channel.execute("echo hi").await;
        let _ = channel.execute("false").await;
        assert_eq!(channel.calls(), vec!["echo hi", "false"]);
        assert_eq!(channel.call_count("echo"), 1);
    }
}
