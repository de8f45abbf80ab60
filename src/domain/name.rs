//! Validated domain names
//!
//! A name is a sequence of dot-separated labels. Each label is 1-63
//! characters, starts with a letter, digit or underscore and continues with
//! letters, digits, underscores or hyphens. A single trailing `.` or `_` is
//! accepted. Literal IP addresses are rejected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Marker that starts a comment in list files
pub const COMMENT_MARKER: char = '#';

/// Maximum number of characters in a name, not counting dots
const MAX_NAME_LENGTH: usize = 255;

static DNS_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_][a-zA-Z0-9_-]{0,62}(\.[a-zA-Z0-9_][a-zA-Z0-9_-]{0,62})*[._]?$")
        .expect("hostname pattern compiles")
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("Empty domain name")]
    Empty,

    #[error("{0} is not a valid DNS name")]
    Invalid(String),

    #[error("{0} is an IP address, not a DNS name")]
    Address(String),

    #[error("{0} is longer than {MAX_NAME_LENGTH} characters")]
    TooLong(String),
}

/// A domain name that passed hostname validation
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DomainName(String);

impl DomainName {
    /// Returns the name as it appeared in the input
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the token would be accepted as a name
    pub fn is_valid(token: &str) -> bool {
        token.parse::<DomainName>().is_ok()
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DomainName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(NameError::Empty);
        }

        if s.chars().filter(|c| *c != '.').count() > MAX_NAME_LENGTH {
            return Err(NameError::TooLong(s.to_string()));
        }

        if s.parse::<IpAddr>().is_ok() {
            return Err(NameError::Address(s.to_string()));
        }

        if !DNS_NAME.is_match(s) {
            return Err(NameError::Invalid(s.to_string()));
        }

        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for DomainName {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DomainName> for String {
    fn from(name: DomainName) -> Self {
        name.0
    }
}
