use tracing::{debug, info, warn};

use crate::system::parse::KeyValues;
use crate::tweaks::TweakError;
use crate::tweaks::backend::TweakBackend;
use crate::tweaks::definition::{TweakDefinition, value_of};
use crate::tweaks::state::TweakState;

/// A loaded tunable: its definition, its backend and its state triple.
#[derive(Debug)]
pub struct Tweak {
    definition: &'static TweakDefinition,
    backend: TweakBackend,
    state: TweakState,
    available: bool,
    loaded: bool,
}

impl Tweak {
    pub fn new(definition: &'static TweakDefinition, backend: TweakBackend) -> Self {
        Self {
            definition,
            backend,
            state: TweakState::new(definition.fields),
            available: !definition.probe_availability,
            loaded: false,
        }
    }

    pub fn id(&self) -> &'static str {
        self.definition.id
    }

    pub fn definition(&self) -> &'static TweakDefinition {
        self.definition
    }

    pub fn state(&self) -> &TweakState {
        &self.state
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_dirty(&self) -> bool {
        self.loaded && self.state.is_dirty()
    }

    /// Reads current and saved values and seeds pending. Tweaks that must be
    /// probed first are left unavailable when the backend says so.
    pub async fn load(&mut self) -> Result<(), TweakError> {
        if self.definition.probe_availability {
            let probe = self.backend.query("is_available").await?;
            self.available = value_of(&probe, "available") == "1";
            if !self.available {
                debug!(tweak = self.id(), "tweak not available on this kernel");
                return Ok(());
            }
        }

        let current = self.backend.query("get_current").await?;
        let saved = self.backend.query("get_saved").await.unwrap_or_else(|err| {
            warn!(tweak = self.id(), error = %err, "no saved state");
            KeyValues::new()
        });
        self.state = TweakState::from_backend(self.definition.fields, current, saved);
        self.loaded = true;
        debug!(tweak = self.id(), dirty = self.state.is_dirty(), "tweak loaded");
        Ok(())
    }

    /// Same as [`Tweak::load`]; discards pending edits.
    pub async fn reload(&mut self) -> Result<(), TweakError> {
        self.load().await
    }

    fn ensure_available(&self) -> Result<(), TweakError> {
        if self.available {
            Ok(())
        } else {
            Err(TweakError::Unavailable(self.id().to_string()))
        }
    }

    async fn run_checked(&self, action: &'static str, ack: Option<&str>) -> Result<(), TweakError> {
        let output = self.backend.run(action, &self.state.pending_args()).await?;
        if let Some(ack) = ack
            && !output.contains(ack)
        {
            return Err(TweakError::Rejected {
                tweak: self.id().to_string(),
                action,
                output,
            });
        }
        Ok(())
    }

    /// Persists pending as the new saved snapshot. The live system is not
    /// touched.
    pub async fn save(&mut self) -> Result<(), TweakError> {
        self.ensure_available()?;
        self.run_checked("save", self.definition.save_ack).await?;
        self.state.mark_saved();
        info!(tweak = self.id(), "tweak saved");
        Ok(())
    }

    /// Pushes pending to the live system, then re-reads current. Pending is
    /// kept as is even when the device clamped the requested value.
    pub async fn apply(&mut self) -> Result<(), TweakError> {
        self.ensure_available()?;
        self.run_checked("apply", self.definition.apply_ack).await?;
        let current = self.backend.query("get_current").await?;
        self.state.refresh_current(current);
        info!(tweak = self.id(), "tweak applied");
        Ok(())
    }

    pub async fn save_and_apply(&mut self) -> Result<(), TweakError> {
        self.save().await?;
        self.apply().await
    }

    /// Pending snapshot, for presets.
    pub fn get_state(&self) -> KeyValues {
        self.state.pending().clone()
    }

    /// Overwrites pending wholesale and returns the dirty flag.
    pub fn set_state(&mut self, snapshot: KeyValues) -> bool {
        self.state.set_pending(snapshot)
    }

    pub fn set_field(&mut self, key: &str, value: impl Into<String>) -> bool {
        self.state.set_pending_value(key, value)
    }

    /// Steps a choice field to its next or previous option. Returns false when
    /// the field has no options.
    pub fn cycle_field(&mut self, key: &str, forward: bool) -> bool {
        let Some(field) = self.definition.field(key) else {
            return false;
        };
        let options = field.options(self.state.current());
        if options.is_empty() {
            return false;
        }
        let pending = value_of(self.state.pending(), key);
        let next = match options.iter().position(|o| o == pending) {
            Some(idx) if forward => (idx + 1) % options.len(),
            Some(idx) => (idx + options.len() - 1) % options.len(),
            None => 0,
        };
        self.state.set_pending_value(key, options[next].clone());
        true
    }
}
