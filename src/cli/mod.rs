//! # Command-Line Interface
//!
//! Flag parsing, logging setup and daemon mode.
//!
//! ## Sources of tasks
//!
//! | Source | Tasks | Relative paths resolve against |
//! |--------|-------|-------------------------------|
//! | `--config FILE` | any number, from the file | the config file's directory |
//! | `--file` and friends | exactly one | the working directory |
//!
//! The two sources cannot be combined. Every flag except `--verbose` and
//! `--config` can also be set through a `DNS_LOOKUPER_*` environment
//! variable, which counts as if given on the command line.
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug logging on standard error:
//! ```bash
//! dns-lookuper -v -f domains.lst -r list
//! ```
//! `RUST_LOG` overrides the level when set.
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the configured tasks.

mod app;
mod daemon;
mod output;

pub use app::{run, Cli};
pub use output::init_logging;
