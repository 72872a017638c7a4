use std::path::Path;

use tracing::warn;

use crate::channel::SharedChannel;
use crate::system::parse::KeyValues;
use crate::tweaks::backend::TweakBackend;
use crate::tweaks::definition::TweakDefinition;
use crate::tweaks::{Tweak, TweakError, builtin_definitions};

/// Registry of tweaks, looked up by id.
#[derive(Debug, Default)]
pub struct TweakStore {
    tweaks: Vec<Tweak>,
}

impl TweakStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every built-in tweak against `data_dir`.
    pub fn builtin(channel: SharedChannel, data_dir: &Path) -> Self {
        let mut store = Self::new();
        for definition in builtin_definitions() {
            store.register(definition, channel.clone(), data_dir);
        }
        store
    }

    pub fn register(
        &mut self,
        definition: &'static TweakDefinition,
        channel: SharedChannel,
        data_dir: &Path,
    ) {
        let backend = TweakBackend::new(channel, data_dir, definition.id);
        self.tweaks.retain(|t| t.id() != definition.id);
        self.tweaks.push(Tweak::new(definition, backend));
    }

    /// Loads every tweak. Failures are logged and returned; the other tweaks
    /// still load.
    pub async fn load_all(&mut self) -> Vec<(&'static str, TweakError)> {
        let mut failures = Vec::new();
        for tweak in &mut self.tweaks {
            if let Err(err) = tweak.load().await {
                warn!(tweak = tweak.id(), error = %err, "tweak failed to load");
                failures.push((tweak.id(), err));
            }
        }
        failures
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tweaks.iter().map(Tweak::id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tweak> {
        self.tweaks.iter()
    }

    /// Tweaks that can be shown and edited on this device.
    pub fn available(&self) -> impl Iterator<Item = &Tweak> {
        self.tweaks.iter().filter(|t| t.is_available() && t.is_loaded())
    }

    pub fn get(&self, id: &str) -> Option<&Tweak> {
        self.tweaks.iter().find(|t| t.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Tweak> {
        self.tweaks.iter_mut().find(|t| t.id() == id)
    }

    fn require_mut(&mut self, id: &str) -> Result<&mut Tweak, TweakError> {
        self.get_mut(id)
            .ok_or_else(|| TweakError::UnknownTweak(id.to_string()))
    }

    pub fn get_state(&self, id: &str) -> Result<KeyValues, TweakError> {
        self.get(id)
            .map(Tweak::get_state)
            .ok_or_else(|| TweakError::UnknownTweak(id.to_string()))
    }

    pub fn set_state(&mut self, id: &str, snapshot: KeyValues) -> Result<bool, TweakError> {
        Ok(self.require_mut(id)?.set_state(snapshot))
    }

    pub async fn save(&mut self, id: &str) -> Result<(), TweakError> {
        self.require_mut(id)?.save().await
    }

    pub async fn apply(&mut self, id: &str) -> Result<(), TweakError> {
        self.require_mut(id)?.apply().await
    }

    pub async fn save_and_apply(&mut self, id: &str) -> Result<(), TweakError> {
        self.require_mut(id)?.save_and_apply().await
    }

    pub async fn reload(&mut self, id: &str) -> Result<(), TweakError> {
        self.require_mut(id)?.reload().await
    }

    /// Saves and/or applies each listed tweak. A failure is logged and
    /// returned; the remaining tweaks are still processed.
    pub async fn commit(
        &mut self,
        ids: &[String],
        save: bool,
        apply: bool,
    ) -> Vec<(String, TweakError)> {
        let mut failures = Vec::new();
        for id in ids {
            let result = match (save, apply) {
                (true, true) => self.save_and_apply(id).await,
                (true, false) => self.save(id).await,
                (false, true) => self.apply(id).await,
                (false, false) => Ok(()),
            };
            if let Err(err) = result {
                warn!(tweak = %id, error = %err, "tweak commit failed");
                failures.push((id.clone(), err));
            }
        }
        failures
    }

    pub fn any_dirty(&self) -> bool {
        self.tweaks.iter().any(Tweak::is_dirty)
    }
}
