//! Output destinations
//!
//! `-` and `/dev/stdout` write to standard output, `/dev/stderr` to standard
//! error. Anything else is a file path, created or truncated on open.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

const STDOUT_MARKERS: &[&str] = &["-", "/dev/stdout"];
const STDERR_MARKER: &str = "/dev/stderr";

/// Where a task writes its output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    Stderr,
    File(PathBuf),
}

impl Destination {
    /// Interprets `raw`, resolving relative file paths against `base`
    pub fn parse(raw: &str, base: &Path) -> Self {
        if STDOUT_MARKERS.contains(&raw) {
            Destination::Stdout
        } else if raw == STDERR_MARKER {
            Destination::Stderr
        } else {
            Destination::File(base.join(raw))
        }
    }

    /// Returns true for standard output and standard error
    pub fn is_console(&self) -> bool {
        !matches!(self, Destination::File(_))
    }

    pub fn open(&self) -> Result<Sink> {
        Ok(match self {
            Destination::Stdout => Sink::Stdout(io::stdout()),
            Destination::Stderr => Sink::Stderr(io::stderr()),
            Destination::File(path) => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create output file: {}", path.display()))?;
                Sink::File(BufWriter::new(file))
            }
        })
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Stdout => f.write_str("standard output"),
            Destination::Stderr => f.write_str("standard error"),
            Destination::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// An opened destination
pub enum Sink {
    Stdout(io::Stdout),
    Stderr(io::Stderr),
    File(BufWriter<File>),
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Sink::Stdout(out) => out.write(buf),
            Sink::Stderr(err) => err.write(buf),
            Sink::File(file) => file.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Sink::Stdout(out) => out.flush(),
            Sink::Stderr(err) => err.flush(),
            Sink::File(file) => file.flush(),
        }
    }
}
