//! Name sets parsed from list files
//!
//! List files hold whitespace-separated names, any number per line. A token
//! starting with `#` comments out the rest of its line. Tokens that are not
//! valid names are kept per source file so the caller can decide whether
//! they are fatal.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use super::name::{DomainName, COMMENT_MARKER};

/// Names collected from one or more list files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameSet {
    parsed: BTreeSet<DomainName>,
    unparsed: BTreeMap<PathBuf, Vec<String>>,
}

impl NameSet {
    /// Creates an empty name set
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every token of one line read from `source`
    pub fn add_line(&mut self, source: &Path, line: &str) {
        for token in line.split_whitespace() {
            if token.starts_with(COMMENT_MARKER) {
                break;
            }

            match token.parse::<DomainName>() {
                Ok(name) => {
                    self.parsed.insert(name);
                }
                Err(_) => self
                    .unparsed
                    .entry(source.to_path_buf())
                    .or_default()
                    .push(token.to_string()),
            }
        }
    }

    /// Reads all lines from `reader`, attributing invalid tokens to `source`
    pub fn read_from<R: BufRead>(&mut self, source: &Path, reader: R) -> io::Result<()> {
        for line in reader.lines() {
            self.add_line(source, &line?);
        }
        Ok(())
    }

    /// Valid names, sorted ascending without duplicates
    pub fn parsed_names(&self) -> impl Iterator<Item = &DomainName> {
        self.parsed.iter()
    }

    /// Invalid tokens by source file, in the order they were read
    pub fn unparsed_names(&self) -> &BTreeMap<PathBuf, Vec<String>> {
        &self.unparsed
    }

    /// Returns true if any token failed validation
    pub fn has_unparsed(&self) -> bool {
        !self.unparsed.is_empty()
    }

    /// Number of distinct valid names
    pub fn len(&self) -> usize {
        self.parsed.len()
    }

    /// Returns true if no valid names were read
    pub fn is_empty(&self) -> bool {
        self.parsed.is_empty()
    }

    /// Consumes the set, returning the sorted valid names
    pub fn into_names(self) -> Vec<DomainName> {
        self.parsed.into_iter().collect()
    }
}
