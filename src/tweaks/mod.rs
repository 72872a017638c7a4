//! Persistent tunables backed by shell scripts on the device.
//!
//! Each tweak keeps three copies of its configuration: what the kernel
//! currently reports, what was last saved, and what the user is editing.

pub mod backend;
pub mod definition;
pub mod presets;
pub mod state;
pub mod store;
pub mod thermal;
pub mod tweak;
pub mod zram;

use thiserror::Error;

use crate::channel::CommandError;

pub use store::TweakStore;
pub use tweak::Tweak;

#[derive(Debug, Error)]
pub enum TweakError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("{tweak}: backend rejected {action}: {output}")]
    Rejected {
        tweak: String,
        action: &'static str,
        output: String,
    },

    #[error("unknown tweak: {0}")]
    UnknownTweak(String),

    #[error("{0} is not available on this kernel")]
    Unavailable(String),
}

/// Built-in tweaks, in display order.
pub fn builtin_definitions() -> [&'static definition::TweakDefinition; 2] {
    [&zram::DEFINITION, &thermal::DEFINITION]
}
