//! # Storage Layer
//!
//! Everything that touches the filesystem or the console.
//!
//! | Data | Format | Module |
//! |------|--------|--------|
//! | Config | YAML, JSON or TOML (by extension) | [`config`] |
//! | Domain lists | whitespace-separated names, `#` comments | [`lists`] |
//! | Output | file, standard output or standard error | [`sink`] |
//!
//! Relative paths are resolved by the caller against the config file's
//! directory, or the working directory for command-line tasks.

pub mod config;
pub mod lists;
pub mod sink;

pub use config::{parse_duration, Config, ConfigError, DaemonConfig, SettingsConfig, TaskConfig};
pub use lists::read_names;
pub use sink::{Destination, Sink};
