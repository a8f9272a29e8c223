//! Config module: project-level settings from `.credmgr.toml`.

pub mod settings;

pub use settings::Settings;
