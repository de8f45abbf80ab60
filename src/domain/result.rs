//! Resolution modes and per-name results

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

use super::name::DomainName;

/// Address families requested for a task
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMode {
    /// A records only
    Ipv4,
    /// AAAA records only
    Ipv6,
    /// Both families
    #[default]
    All,
}

impl ResolutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionMode::Ipv4 => "ipv4",
            ResolutionMode::Ipv6 => "ipv6",
            ResolutionMode::All => "all",
        }
    }

    /// Returns true if the address belongs to a requested family
    pub fn accepts(&self, address: &IpAddr) -> bool {
        match self {
            ResolutionMode::Ipv4 => address.is_ipv4(),
            ResolutionMode::Ipv6 => address.is_ipv6(),
            ResolutionMode::All => true,
        }
    }
}

impl fmt::Display for ResolutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a name ended up without addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Failure {
    /// The name does not exist
    NotFound,
    /// The lookup did not finish before its deadline
    Timeout,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::NotFound => f.write_str("no such host"),
            Failure::Timeout => f.write_str("lookup timed out"),
        }
    }
}

/// Addresses found for one name
///
/// `failure` is never serialized; a failed name renders with an empty
/// address list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub name: DomainName,
    pub addresses: Vec<IpAddr>,
    #[serde(skip)]
    pub failure: Option<Failure>,
}

impl ResolutionResult {
    /// A successful result, possibly with no addresses
    pub fn new(name: DomainName, addresses: Vec<IpAddr>) -> Self {
        Self {
            name,
            addresses,
            failure: None,
        }
    }

    /// A result for a name whose lookup failed in a recoverable way
    pub fn failed(name: DomainName, failure: Failure) -> Self {
        Self {
            name,
            addresses: Vec::new(),
            failure: Some(failure),
        }
    }
}
