pub mod action;
pub mod app;
pub mod channel;
pub mod config;
pub mod event;
pub mod format;
pub mod logging;
pub mod monitor;
pub mod sampler;
pub mod system;
pub mod tweaks;
pub mod ui;
