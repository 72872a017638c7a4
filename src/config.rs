use std::path::{Path, PathBuf};

use crossterm::event::KeyCode;
use serde::Deserialize;

use crate::system::gpu::{GpuPlatform, GpuProbe};
use crate::system::units::UnitThresholds;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub backend: BackendConfig,
    pub gpu: GpuConfig,
    pub logging: LoggingConfig,
    pub keybinds: KeybindsConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub refresh_rate_ms: u64,
    pub history_length: usize,
    pub start_tab: String,
    pub cpu_view: String,
    pub theme: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            refresh_rate_ms: 1000,
            history_length: 60,
            start_tab: "monitor".to_string(),
            cpu_view: "cluster".to_string(),
            theme: "dark".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub program: String,
    pub args: Vec<String>,
    pub data_dir: PathBuf,
    pub command_timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig {
            program: "sh".to_string(),
            args: vec!["-c".to_string()],
            data_dir: PathBuf::from("/data/adb/modules/floppy_companion"),
            command_timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GpuConfig {
    pub hz_threshold: u64,
    pub mhz_threshold: u64,
    pub platform: String,
}

impl Default for GpuConfig {
    fn default() -> Self {
        let thresholds = UnitThresholds::default();
        GpuConfig {
            hz_threshold: thresholds.hz_above,
            mhz_threshold: thresholds.mhz_below,
            platform: "auto".to_string(),
        }
    }
}

impl GpuConfig {
    pub fn thresholds(&self) -> UnitThresholds {
        UnitThresholds {
            hz_above: self.hz_threshold,
            mhz_below: self.mhz_threshold,
        }
    }

    pub fn probe(&self, skip_exynos: bool) -> GpuProbe {
        GpuProbe {
            platform: GpuPlatform::from_str_config(&self.platform),
            thresholds: self.thresholds(),
            skip_exynos,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<PathBuf>,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            file: None,
            json: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct KeybindsConfig {
    pub quit: String,
    pub help: String,
    pub next_tab: String,
    pub toggle_cpu_view: String,
    pub save: String,
    pub apply: String,
    pub save_apply: String,
    pub reload: String,
    pub edit: String,
}

impl Default for KeybindsConfig {
    fn default() -> Self {
        KeybindsConfig {
            quit: "q".to_string(),
            help: "?".to_string(),
            next_tab: "Tab".to_string(),
            toggle_cpu_view: "c".to_string(),
            save: "s".to_string(),
            apply: "a".to_string(),
            save_apply: "A".to_string(),
            reload: "r".to_string(),
            edit: "Enter".to_string(),
        }
    }
}

/// Parses a keybind name such as `q`, `Enter`, `Tab` or `Esc`.
pub fn parse_key(s: &str) -> Option<KeyCode> {
    match s {
        "Enter" | "enter" => Some(KeyCode::Enter),
        "Esc" | "Escape" | "esc" | "escape" => Some(KeyCode::Esc),
        "Tab" | "tab" => Some(KeyCode::Tab),
        "Backspace" | "backspace" => Some(KeyCode::Backspace),
        "Space" | "space" => Some(KeyCode::Char(' ')),
        _ => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(KeyCode::Char(c)),
                _ => None,
            }
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("fctop").join("config.toml"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Config::default(),
    }
}

pub fn load_config_from_path(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_default(),
        Err(_) => Config::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.general.refresh_rate_ms, 1000);
        assert_eq!(config.general.history_length, 60);
        assert_eq!(config.backend.program, "sh");
        assert_eq!(config.backend.args, vec!["-c"]);
        assert_eq!(config.gpu.thresholds(), UnitThresholds::default());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.keybinds.quit, "q");
    }

    #[test]
    fn parse_partial_toml() {
        let toml_str = r#"
[general]
refresh_rate_ms = 500
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.refresh_rate_ms, 500);
        assert_eq!(config.general.cpu_view, "cluster");
        assert_eq!(config.backend.command_timeout_ms, 5000);
    }

    #[test]
    fn parse_full_toml() {
        let toml_str = r#"
[general]
refresh_rate_ms = 2000
history_length = 120
start_tab = "tweaks"
cpu_view = "core"

[backend]
program = "su"
args = ["-c"]
data_dir = "/data/local/tmp/fc"

[gpu]
hz_threshold = 50000000
mhz_threshold = 10000
platform = "adreno"

[logging]
level = "debug"
file = "/tmp/fctop.log"
json = true

[keybinds]
quit = "x"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.history_length, 120);
        assert_eq!(config.general.start_tab, "tweaks");
        assert_eq!(config.backend.program, "su");
        assert_eq!(config.backend.data_dir, PathBuf::from("/data/local/tmp/fc"));
        let probe = config.gpu.probe(false);
        assert_eq!(probe.platform, GpuPlatform::Adreno);
        assert_eq!(probe.thresholds.hz_above, 50_000_000);
        assert!(config.logging.json);
        assert_eq!(config.logging.file, Some(PathBuf::from("/tmp/fctop.log")));
        assert_eq!(config.keybinds.quit, "x");
    }

    #[test]
    fn parse_key_names() {
        assert_eq!(parse_key("q"), Some(KeyCode::Char('q')));
        assert_eq!(parse_key("Tab"), Some(KeyCode::Tab));
        assert_eq!(parse_key("Escape"), Some(KeyCode::Esc));
        assert_eq!(parse_key("ctrl+q"), None);
        assert_eq!(parse_key(""), None);
    }

    #[test]
    fn missing_file_returns_default() {
        let config = load_config_from_path(Path::new("/nonexistent/path/config.toml"));
        assert_eq!(config.general.refresh_rate_ms, 1000);
    }

    #[test]
    fn invalid_toml_returns_default() {
        let temp = std::env::temp_dir().join("fctop_test_invalid.toml");
        std::fs::write(&temp, "this is not valid toml {{{{").unwrap();
        let config = load_config_from_path(&temp);
        assert_eq!(config.general.refresh_rate_ms, 1000);
        let _ = std::fs::remove_file(&temp);
    }
}
