//! Main CLI application structure

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};

use super::daemon;
use super::output::init_logging;
use crate::domain::ResolutionMode;
use crate::render::{OutputFormat, Template};
use crate::resolver::LookupBackend;
use crate::storage::{Config, ConfigError, DaemonConfig, SettingsConfig, TaskConfig};
use crate::task::{run_tasks, validate_tasks, Settings};

/// Flags that describe a task or settings and cannot be mixed with `--config`
///
/// `--fail` and `--resolver` are left out: they fill in settings the config
/// file does not set.
const TASK_FLAGS: &[(&str, &str)] = &[
    ("files", "--file"),
    ("output", "--output"),
    ("mode", "--mode"),
    ("format", "--format"),
    ("template_text", "--template-text"),
    ("template_header", "--template-header"),
    ("template_footer", "--template-footer"),
    ("daemon", "--daemon"),
    ("interval", "--interval"),
    ("timeout", "--timeout"),
];

#[derive(Parser, Debug)]
#[command(name = "dns-lookuper")]
#[command(author, version, about = "Resolve lists of domain names and render the addresses")]
pub struct Cli {
    /// Domain list file; repeat or separate with commas
    #[arg(long = "file", short = 'f', env = "DNS_LOOKUPER_FILES", value_delimiter = ',')]
    pub files: Vec<PathBuf>,

    /// Output file, `-` for standard output
    #[arg(long, short = 'o', env = "DNS_LOOKUPER_OUTPUT", default_value = "-")]
    pub output: String,

    /// Address families to resolve
    #[arg(long, short = 'm', env = "DNS_LOOKUPER_MODE", value_enum, default_value_t = ResolutionMode::All)]
    pub mode: ResolutionMode,

    /// Output format
    #[arg(long, short = 'r', env = "DNS_LOOKUPER_FORMAT", value_enum, default_value_t = OutputFormat::Hosts)]
    pub format: OutputFormat,

    /// Template text with {{host}} and {{address}} placeholders
    #[arg(long, short = 't', env = "DNS_LOOKUPER_TEMPLATE_TEXT")]
    pub template_text: Option<String>,

    /// Line written before the template output
    #[arg(long, env = "DNS_LOOKUPER_TEMPLATE_HEADER")]
    pub template_header: Option<String>,

    /// Line written after the template output
    #[arg(long, env = "DNS_LOOKUPER_TEMPLATE_FOOTER")]
    pub template_footer: Option<String>,

    /// Config file (YAML, JSON or TOML)
    #[arg(long, short = 'c', env = "DNS_LOOKUPER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Re-run all tasks every interval
    #[arg(long, short = 'd', env = "DNS_LOOKUPER_DAEMON")]
    pub daemon: bool,

    /// Daemon interval, e.g. 30s or 5m
    #[arg(long, short = 'i', env = "DNS_LOOKUPER_INTERVAL", default_value = "1m")]
    pub interval: String,

    /// Timeout of a single lookup, e.g. 15s
    #[arg(long, short = 'w', env = "DNS_LOOKUPER_TIMEOUT", default_value = "15s")]
    pub timeout: String,

    /// Fail on invalid or unresolvable names instead of warning
    #[arg(long, env = "DNS_LOOKUPER_FAIL")]
    pub fail: bool,

    /// Lookup backend
    #[arg(long, env = "DNS_LOOKUPER_RESOLVER", value_enum, default_value_t = LookupBackend::System)]
    pub resolver: LookupBackend,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl Cli {
    /// Single task described by the flags
    fn task_config(&self) -> TaskConfig {
        let template = Template {
            text: self.template_text.clone().unwrap_or_default(),
            header: self.template_header.clone().unwrap_or_default(),
            footer: self.template_footer.clone().unwrap_or_default(),
        };

        TaskConfig {
            files: self.files.clone(),
            output: self.output.clone(),
            mode: self.mode,
            format: self.format,
            template: Some(template),
        }
    }

    fn settings_config(&self) -> SettingsConfig {
        SettingsConfig {
            lookup_timeout: Some(self.timeout.clone()),
            fail: Some(self.fail),
            resolver: Some(self.resolver),
            daemon: DaemonConfig {
                enabled: self.daemon,
                interval: Some(self.interval.clone()),
            },
        }
    }
}

/// Task and settings flags given on the command line or through the environment
fn explicit_flags(matches: &ArgMatches) -> Vec<String> {
    TASK_FLAGS
        .iter()
        .filter(|(id, _)| {
            matches!(
                matches.value_source(id),
                Some(ValueSource::CommandLine | ValueSource::EnvVariable)
            )
        })
        .map(|(_, flag)| flag.to_string())
        .collect()
}

/// Directory that relative paths in a config file resolve against
fn config_base_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Builds the configuration from a config file or from flags
///
/// Returns `None` when neither is given.
fn load_config(cli: &Cli, matches: &ArgMatches) -> Result<Option<(Config, PathBuf)>> {
    let explicit = explicit_flags(matches);

    if let Some(path) = &cli.config {
        if !explicit.is_empty() {
            return Err(ConfigError::ConflictingSources(explicit).into());
        }

        let mut config = Config::load(path)?;
        config.settings.fail.get_or_insert(cli.fail);
        config.settings.resolver.get_or_insert(cli.resolver);
        tracing::debug!(path = %path.display(), tasks = config.tasks.len(), "loaded config file");

        return Ok(Some((config, config_base_dir(path))));
    }

    if explicit.is_empty() {
        return Ok(None);
    }

    let base_dir = std::env::current_dir().context("Failed to determine working directory")?;
    let config = Config {
        settings: cli.settings_config(),
        tasks: vec![cli.task_config()],
    };

    Ok(Some((config, base_dir)))
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    init_logging(cli.verbose);

    let Some((config, base_dir)) = load_config(&cli, &matches)? else {
        eprintln!("{}", Cli::command().render_help());
        return Err(anyhow!("Nothing to do: pass --config or at least one --file"));
    };

    let settings = Settings::from_config(&config.settings, base_dir)?;
    let tasks = validate_tasks(&config.tasks, &settings)?;
    tracing::debug!(
        tasks = tasks.len(),
        backend = settings.backend.as_str(),
        timeout = ?settings.lookup_timeout,
        fail = settings.fail,
        "configuration validated"
    );

    let lookup = settings.backend.build(settings.lookup_timeout)?;

    match settings.daemon {
        Some(interval) => daemon::run(interval, settings.fail, || {
            run_tasks(&tasks, &settings, lookup.as_ref())
        }),
        None => run_tasks(&tasks, &settings, lookup.as_ref()),
    }
}
