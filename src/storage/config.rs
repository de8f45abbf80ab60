//! Configuration file handling
//!
//! A config file holds global `settings` and a list of `tasks`. YAML is the
//! default encoding (JSON parses as YAML); a `.toml` extension selects TOML.
//! Keys are camelCase and unknown keys are rejected.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ResolutionMode;
use crate::render::{OutputFormat, Template, TemplateError};
use crate::resolver::LookupBackend;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Cannot combine a config file with task or settings flags: {}", .0.join(", "))]
    ConflictingSources(Vec<String>),

    #[error("No tasks defined")]
    NoTasks,

    #[error("Task has no input files")]
    MissingFiles,

    #[error("Task has no output")]
    MissingOutput,

    #[error("Console output is not allowed in daemon mode")]
    ConsoleInDaemonMode,

    #[error("Only one task may write to the console")]
    MultipleConsoleTasks,

    #[error("Output format \"template\" requires template text")]
    MissingTemplateText,

    #[error("Template is only allowed with output format \"template\", got \"{0}\"")]
    UnexpectedTemplate(OutputFormat),

    #[error("Invalid template")]
    Template(#[from] TemplateError),

    #[error("Invalid duration \"{value}\": {reason}")]
    Duration { value: String, reason: String },

    #[error("Task #{index} is invalid")]
    Task {
        index: usize,
        #[source]
        source: Box<ConfigError>,
    },
}

/// Top-level config file layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    pub settings: SettingsConfig,
    pub tasks: Vec<TaskConfig>,
}

/// Global settings; every field falls back to the command-line default
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct SettingsConfig {
    /// Per-lookup timeout, e.g. `15s`
    pub lookup_timeout: Option<String>,

    /// Fail on invalid or unresolvable names instead of warning
    pub fail: Option<bool>,

    /// Lookup backend
    pub resolver: Option<LookupBackend>,

    pub daemon: DaemonConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct DaemonConfig {
    pub enabled: bool,

    /// Pause between passes, e.g. `1m`
    pub interval: Option<String>,
}

/// One task as written in the config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct TaskConfig {
    pub files: Vec<PathBuf>,
    pub output: String,
    pub mode: ResolutionMode,
    pub format: OutputFormat,
    pub template: Option<Template>,
}

impl Config {
    /// Loads a config file, choosing the decoder by extension
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let config: Result<Config, ConfigError> = if is_toml {
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        };

        config.with_context(|| format!("Failed to load config file: {}", path.display()))
    }
}

/// Parses a duration like `1m`, `15s`, `1h30m` or `1.5s`
///
/// Accepts a sequence of decimal numbers, each with a unit out of `ns`,
/// `us` (or `µs`), `ms`, `s`, `m` and `h`. A bare `0` is allowed. Negative
/// durations are rejected.
pub fn parse_duration(value: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: &str| ConfigError::Duration {
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let mut rest = value.strip_prefix('+').unwrap_or(value);
    if rest.starts_with('-') {
        return Err(invalid("negative durations are not allowed"));
    }
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(invalid("empty duration"));
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let (whole, after) = split_digits(rest);
        let (fraction, after) = match after.strip_prefix('.') {
            Some(after) => split_digits(after),
            None => ("", after),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid("expected a number"));
        }

        let unit_end = after
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after.len());
        let (unit, after) = after.split_at(unit_end);
        let scale = match unit_nanos(unit) {
            Some(scale) => scale,
            None if unit.is_empty() => return Err(invalid("missing unit")),
            None => return Err(invalid(&format!("unknown unit \"{}\"", unit))),
        };

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("number out of range"))?
        };
        let mut amount = whole
            .checked_mul(scale)
            .ok_or_else(|| invalid("duration out of range"))?;

        if !fraction.is_empty() {
            // Digits past nanosecond precision carry no weight
            let digits = &fraction[..fraction.len().min(18)];
            let numerator: u128 = digits.parse().map_err(|_| invalid("expected a number"))?;
            amount = amount
                .checked_add(numerator * scale / 10u128.pow(digits.len() as u32))
                .ok_or_else(|| invalid("duration out of range"))?;
        }

        total = total
            .checked_add(amount)
            .ok_or_else(|| invalid("duration out of range"))?;
        rest = after;
    }

    let nanos = u64::try_from(total).map_err(|_| invalid("duration out of range"))?;
    Ok(Duration::from_nanos(nanos))
}

fn split_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

fn unit_nanos(unit: &str) -> Option<u128> {
    Some(match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => 1_000_000_000,
        "m" => 60 * 1_000_000_000,
        "h" => 60 * 60 * 1_000_000_000,
        _ => return None,
    })
}
