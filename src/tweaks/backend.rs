use std::path::{Path, PathBuf};

use tracing::debug;

use crate::channel::{CommandError, SharedChannel, quote_arg};
use crate::system::parse::{KeyValues, parse_key_value};

/// Runs one tweak's shell script: `sh '<data_dir>/tweaks/<id>.sh' <action> '<arg>'...`.
#[derive(Clone)]
pub struct TweakBackend {
    channel: SharedChannel,
    script: PathBuf,
}

impl TweakBackend {
    pub fn new(channel: SharedChannel, data_dir: &Path, id: &str) -> Self {
        Self {
            channel,
            script: data_dir.join("tweaks").join(format!("{id}.sh")),
        }
    }

    pub fn script(&self) -> &Path {
        &self.script
    }

    pub fn command(&self, action: &str, args: &[String]) -> String {
        let mut cmd = format!("sh {} {action}", quote_arg(&self.script.to_string_lossy()));
        for arg in args {
            cmd.push(' ');
            cmd.push_str(&quote_arg(arg));
        }
        cmd
    }

    pub async fn run(&self, action: &str, args: &[String]) -> Result<String, CommandError> {
        let cmd = self.command(action, args);
        debug!(script = %self.script.display(), action, "tweak backend");
        self.channel.execute(&cmd).await
    }

    pub async fn query(&self, action: &str) -> Result<KeyValues, CommandError> {
        self.run(action, &[]).await.map(|out| parse_key_value(&out))
    }
}

impl std::fmt::Debug for TweakBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TweakBackend")
            .field("script", &self.script)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::channel::scripted::ScriptedChannel;

    #[test]
    fn command_quotes_script_and_args() {
        let backend = TweakBackend::new(
            Arc::new(ScriptedChannel::new()),
            Path::new("/data/adb/modules/floppy_companion"),
            "zram",
        );
        let cmd = backend.command("save", &["4294967296".to_string(), "lz4".to_string()]);
        assert_eq!(
            cmd,
            "sh '/data/adb/modules/floppy_companion/tweaks/zram.sh' save '4294967296' 'lz4'"
        );
        assert_eq!(
            backend.command("get_current", &[]),
            "sh '/data/adb/modules/floppy_companion/tweaks/zram.sh' get_current"
        );
    }

    #[tokio::test]
    async fn query_parses_key_values() {
        let channel = Arc::new(ScriptedChannel::new());
        channel.respond("thermal.sh' get_current", "mode=2\ncustom_freq=1300000");
        let backend = TweakBackend::new(channel, Path::new("/m"), "thermal");
        let current = backend.query("get_current").await.unwrap();
        assert_eq!(current["mode"], "2");
        assert_eq!(current["custom_freq"], "1300000");
    }
}
