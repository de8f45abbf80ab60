//! dns-lookuper - Resolve lists of domain names and render the addresses
//!
//! Reads domain names from list files, resolves them through the system
//! resolver or a DNS client, and writes the addresses as hosts entries, CSV,
//! JSON, YAML, a plain address list or a custom template. Runs once, or
//! repeatedly in daemon mode.

pub mod domain;
pub mod render;
pub mod resolver;
pub mod storage;
pub mod task;
pub mod cli;

pub use domain::{DomainName, NameSet, ResolutionMode, ResolutionResult};
pub use render::{OutputFormat, Template};
pub use resolver::{Lookup, LookupBackend, Resolver};
pub use task::{Settings, Task};
