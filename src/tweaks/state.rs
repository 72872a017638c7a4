//! The current / saved / pending triple of a tunable and the dirty check.
//!
//! Everything here is pure: the I/O lives in [`super::Tweak`].

use crate::system::parse::KeyValues;
use crate::tweaks::definition::{FieldSpec, value_of};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TweakState {
    fields: &'static [FieldSpec],
    current: KeyValues,
    saved: Option<KeyValues>,
    pending: KeyValues,
    /// What pending was seeded with on load. Stands in for live values the
    /// device did not report while nothing has been saved.
    baseline: KeyValues,
}

impl TweakState {
    pub fn new(fields: &'static [FieldSpec]) -> Self {
        Self {
            fields,
            current: KeyValues::new(),
            saved: None,
            pending: KeyValues::new(),
            baseline: KeyValues::new(),
        }
    }

    /// Builds the triple from backend output. `saved` only counts as existing
    /// when some declared field in it is non-empty.
    pub fn from_backend(fields: &'static [FieldSpec], current: KeyValues, saved: KeyValues) -> Self {
        let has_saved = fields.iter().any(|f| !value_of(&saved, f.key).is_empty());
        let mut state = Self {
            fields,
            current,
            saved: has_saved.then_some(saved),
            pending: KeyValues::new(),
            baseline: KeyValues::new(),
        };
        state.baseline = state.seed();
        state.pending = state.baseline.clone();
        state
    }

    /// Per field: saved value, else current value, else the default.
    fn seed(&self) -> KeyValues {
        self.fields
            .iter()
            .map(|field| {
                let saved = self.saved.as_ref().map_or("", |s| value_of(s, field.key));
                let current = value_of(&self.current, field.key);
                let value = [saved, current]
                    .into_iter()
                    .find(|v| !v.is_empty())
                    .unwrap_or(field.default);
                (field.key.to_string(), value.to_string())
            })
            .collect()
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    pub fn current(&self) -> &KeyValues {
        &self.current
    }

    pub fn saved(&self) -> Option<&KeyValues> {
        self.saved.as_ref()
    }

    pub fn pending(&self) -> &KeyValues {
        &self.pending
    }

    /// Value a field is compared against: the saved value once a save has
    /// happened, otherwise the live value. A live value the device did not
    /// report falls back to the seeded one, so a fresh load never shows as
    /// unsaved.
    pub fn reference_value(&self, key: &str) -> &str {
        if let Some(saved) = &self.saved {
            return value_of(saved, key);
        }
        match value_of(&self.current, key) {
            "" => value_of(&self.baseline, key),
            live => live,
        }
    }

    /// Declared fields whose pending value disagrees with the reference.
    pub fn dirty_fields(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|field| field.is_compared(&self.pending))
            .filter(|field| value_of(&self.pending, field.key) != self.reference_value(field.key))
            .map(|field| field.key)
            .collect()
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty_fields().is_empty()
    }

    /// Replaces pending wholesale and returns the new dirty flag.
    pub fn set_pending(&mut self, snapshot: KeyValues) -> bool {
        self.pending = snapshot;
        self.is_dirty()
    }

    pub fn set_pending_value(&mut self, key: &str, value: impl Into<String>) -> bool {
        self.pending.insert(key.to_string(), value.into());
        self.is_dirty()
    }

    /// Pending values in declaration order, as passed to `save`/`apply`.
    pub fn pending_args(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(|field| value_of(&self.pending, field.key).to_string())
            .collect()
    }

    /// Records a successful save. The live values are untouched.
    pub fn mark_saved(&mut self) {
        let saved = self
            .fields
            .iter()
            .map(|field| (field.key.to_string(), value_of(&self.pending, field.key).to_string()))
            .collect();
        self.saved = Some(saved);
    }

    /// Records a fresh read of the live values. Pending is untouched.
    pub fn refresh_current(&mut self, current: KeyValues) {
        self.current = current;
    }
}
