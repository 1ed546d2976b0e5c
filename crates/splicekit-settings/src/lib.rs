//! # SpliceKit Settings
//!
//! Configuration file handling for the SpliceKit pipeline: processing
//! defaults (merge threshold, transition length), output defaults (pause
//! behavior, output directory), and color names. Files are JSON or TOML,
//! stored in the platform config directory.

pub mod config;
pub mod error;

pub use config::{Config, OutputSettings, ProcessingSettings};
pub use error::{SettingsError, SettingsResult};
