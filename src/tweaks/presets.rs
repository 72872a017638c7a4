//! Named bundles of pending tweak values stored as TOML.
//!
//! ```toml
//! name = "gaming"
//!
//! [tweaks.zram]
//! disksize = "6442450944"
//! algorithm = "lz4"
//! enabled = "1"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::system::parse::KeyValues;
use crate::tweaks::{TweakError, TweakStore};

#[derive(Debug, Error)]
pub enum PresetError {
    #[error("preset i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid preset: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize preset: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("preset not found: {0}")]
    NotFound(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    #[serde(default)]
    pub tweaks: BTreeMap<String, KeyValues>,
}

impl Preset {
    /// Snapshots the pending state of every loaded, available tweak.
    pub fn capture(name: &str, store: &TweakStore) -> Self {
        let tweaks = store
            .available()
            .map(|tweak| (tweak.id().to_string(), tweak.get_state()))
            .collect();
        Self {
            name: name.to_string(),
            tweaks,
        }
    }

    /// Overwrites pending state of each tweak named in the preset. Returns
    /// the ids that were updated; unknown, unavailable and unloaded tweaks
    /// are skipped.
    pub fn apply_to(&self, store: &mut TweakStore) -> Vec<String> {
        let mut applied = Vec::new();
        for (id, values) in &self.tweaks {
            let usable = store
                .get(id)
                .map(|tweak| tweak.is_available() && tweak.is_loaded());
            let result = match usable {
                Some(false) => Err(TweakError::Unavailable(id.clone())),
                _ => store.set_state(id, values.clone()),
            };
            match result {
                Ok(_) => applied.push(id.clone()),
                Err(err) => warn!(preset = %self.name, tweak = %id, error = %err, "skipping preset entry"),
            }
        }
        info!(preset = %self.name, count = applied.len(), "preset applied to pending state");
        applied
    }

    pub fn from_toml(text: &str) -> Result<Self, PresetError> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml(&self) -> Result<String, PresetError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, PresetError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(PresetError::NotFound(path.display().to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), PresetError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }
}

pub fn presets_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("fctop").join("presets"))
}

pub fn preset_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.toml"))
}
