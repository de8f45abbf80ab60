//! # Tasks
//!
//! A task reads list files, resolves the names and renders the results to
//! one destination. [`Settings`] apply to every task of a run.
//!
//! ## Validation
//!
//! Tasks are validated once, before anything is resolved:
//!
//! | Rule | Error |
//! |------|-------|
//! | at least one input file | [`ConfigError::MissingFiles`] |
//! | non-empty output | [`ConfigError::MissingOutput`] |
//! | `template` format has template text that parses | [`ConfigError::MissingTemplateText`], [`ConfigError::Template`] |
//! | other formats carry no template | [`ConfigError::UnexpectedTemplate`] |
//! | no console output in daemon mode | [`ConfigError::ConsoleInDaemonMode`] |
//! | at most one console task | [`ConfigError::MultipleConsoleTasks`] |

mod runner;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::domain::{DomainName, Failure, ResolutionMode};
use crate::render::{OutputFormat, Template};
use crate::resolver::{LookupBackend, DEFAULT_TIMEOUT};
use crate::storage::{parse_duration, ConfigError, Destination, SettingsConfig, TaskConfig};

pub use runner::{run_task, run_tasks};

/// Daemon interval used when none is configured
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Names that kept a task from completing under the fail policy
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Invalid names in list files: {}", describe_invalid(.0))]
    InvalidNames(BTreeMap<PathBuf, Vec<String>>),

    #[error("Failed to resolve {} name(s): {}", .0.len(), describe_failed(.0))]
    FailedLookups(Vec<(DomainName, Failure)>),
}

fn describe_invalid(unparsed: &BTreeMap<PathBuf, Vec<String>>) -> String {
    unparsed
        .iter()
        .map(|(file, tokens)| format!("{}: {}", file.display(), tokens.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

fn describe_failed(failed: &[(DomainName, Failure)]) -> String {
    failed
        .iter()
        .map(|(name, failure)| format!("{} ({})", name, failure))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Run-wide settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub lookup_timeout: Duration,

    /// Fail the task on invalid or unresolvable names instead of warning
    pub fail: bool,

    pub backend: LookupBackend,

    /// Interval between passes; `None` runs once
    pub daemon: Option<Duration>,

    /// Directory relative paths are resolved against
    pub base_dir: PathBuf,
}

impl Settings {
    pub fn from_config(config: &SettingsConfig, base_dir: PathBuf) -> Result<Self, ConfigError> {
        let lookup_timeout = match &config.lookup_timeout {
            Some(value) => parse_duration(value)?,
            None => DEFAULT_TIMEOUT,
        };
        if lookup_timeout.is_zero() {
            return Err(ConfigError::Invalid("lookup timeout must be positive".to_string()));
        }

        // Checked even when the daemon is off
        let interval = match &config.daemon.interval {
            Some(value) => parse_duration(value)?,
            None => DEFAULT_INTERVAL,
        };
        if interval.is_zero() {
            return Err(ConfigError::Invalid("daemon interval must be positive".to_string()));
        }

        Ok(Self {
            lookup_timeout,
            fail: config.fail.unwrap_or(false),
            backend: config.resolver.unwrap_or_default(),
            daemon: config.daemon.enabled.then_some(interval),
            base_dir,
        })
    }
}

/// A validated task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub files: Vec<PathBuf>,
    pub output: Destination,
    pub mode: ResolutionMode,
    pub format: OutputFormat,
    pub template: Option<Template>,
}

impl Task {
    /// Validates one task
    ///
    /// `console_claimed` tells whether an earlier task already writes to the
    /// console. Returns the task and the updated claim.
    pub fn from_config(
        config: &TaskConfig,
        settings: &Settings,
        console_claimed: bool,
    ) -> Result<(Self, bool), ConfigError> {
        if config.files.is_empty() {
            return Err(ConfigError::MissingFiles);
        }
        if config.output.is_empty() {
            return Err(ConfigError::MissingOutput);
        }

        let template = config.template.clone().filter(|t| !t.is_empty());
        match (config.format, &template) {
            (OutputFormat::Template, Some(template)) if !template.text.is_empty() => {
                template.compile()?;
            }
            (OutputFormat::Template, _) => return Err(ConfigError::MissingTemplateText),
            (format, Some(_)) => return Err(ConfigError::UnexpectedTemplate(format)),
            (_, None) => {}
        }

        let output = Destination::parse(&config.output, &settings.base_dir);
        if output.is_console() {
            if settings.daemon.is_some() {
                return Err(ConfigError::ConsoleInDaemonMode);
            }
            if console_claimed {
                return Err(ConfigError::MultipleConsoleTasks);
            }
        }
        let console_claimed = console_claimed || output.is_console();

        let task = Task {
            files: config
                .files
                .iter()
                .map(|file| settings.base_dir.join(file))
                .collect(),
            output,
            mode: config.mode,
            format: config.format,
            template,
        };

        Ok((task, console_claimed))
    }
}

/// Validates all tasks in order, failing on the first invalid one
pub fn validate_tasks(configs: &[TaskConfig], settings: &Settings) -> Result<Vec<Task>, ConfigError> {
    if configs.is_empty() {
        return Err(ConfigError::NoTasks);
    }

    let mut console_claimed = false;
    let mut tasks = Vec::with_capacity(configs.len());

    for (index, config) in configs.iter().enumerate() {
        let (task, claimed) =
            Task::from_config(config, settings, console_claimed).map_err(|e| ConfigError::Task {
                index: index + 1,
                source: Box::new(e),
            })?;
        console_claimed = claimed;
        tasks.push(task);
    }

    Ok(tasks)
}
