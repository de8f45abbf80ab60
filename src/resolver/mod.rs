//! # Name Resolution
//!
//! Resolves names one at a time through a pluggable [`Lookup`] backend.
//!
//! ## Backends
//!
//! | Backend | Type | Source of truth |
//! |---------|------|-----------------|
//! | `system` | [`SystemLookup`] | OS resolver (`getaddrinfo`, hosts file, nsswitch) |
//! | `dns` | [`DnsLookup`] | hickory-resolver client using the system `resolv.conf` |
//! | fixed table | [`StaticLookup`] | in-memory answers, for tests and dry runs |
//!
//! ## Outcome classification
//!
//! Every backend maps its own errors onto [`LookupError`]. The [`Resolver`]
//! turns `NotFound` and `Timeout` into failed entries, `NoSuitableAddress`
//! into an empty entry, and aborts the batch on `Other`.

mod dns;
mod fixed;
mod system;

use std::error::Error as StdError;
use std::net::IpAddr;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{DomainName, Failure, ResolutionMode, ResolutionResult};

pub use dns::DnsLookup;
pub use fixed::StaticLookup;
pub use system::SystemLookup;

/// Per-lookup deadline used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Classified outcome of a failed lookup
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("no such host")]
    NotFound,

    #[error("lookup timed out")]
    Timeout,

    #[error("no suitable address found")]
    NoSuitableAddress,

    #[error(transparent)]
    Other(Box<dyn StdError + Send + Sync>),
}

/// A lookup that could not be classified; aborts the whole batch
#[derive(Debug, Error)]
#[error("Failed to resolve {name}")]
pub struct ResolveError {
    pub name: DomainName,
    #[source]
    pub source: Box<dyn StdError + Send + Sync>,
}

/// Address lookup capability
pub trait Lookup {
    /// Looks up addresses of `name` in the families `mode` asks for,
    /// giving up after `deadline`
    fn lookup(
        &self,
        name: &DomainName,
        mode: ResolutionMode,
        deadline: Duration,
    ) -> Result<Vec<IpAddr>, LookupError>;
}

/// Lookup backend selected in settings
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum LookupBackend {
    /// Operating system resolver
    #[default]
    System,
    /// Built-in DNS client
    Dns,
}

impl LookupBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupBackend::System => "system",
            LookupBackend::Dns => "dns",
        }
    }

    /// Creates the backend; `timeout` is the per-lookup deadline
    pub fn build(self, timeout: Duration) -> Result<Box<dyn Lookup>> {
        tracing::debug!(backend = self.as_str(), "creating lookup backend");
        Ok(match self {
            LookupBackend::System => Box::new(SystemLookup::new()),
            LookupBackend::Dns => Box::new(DnsLookup::new(timeout)?),
        })
    }
}

/// Sequential resolver over a lookup backend
pub struct Resolver<'a> {
    lookup: &'a dyn Lookup,
    mode: ResolutionMode,
    timeout: Duration,
}

impl<'a> Resolver<'a> {
    pub fn new(lookup: &'a dyn Lookup) -> Self {
        Self {
            lookup,
            mode: ResolutionMode::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_mode(mut self, mode: ResolutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolves `names` in order, one result per name
    ///
    /// Each name gets its own deadline. The first unclassified error stops
    /// the batch; names after it are not looked up.
    pub fn resolve(&self, names: &[DomainName]) -> Result<Vec<ResolutionResult>, ResolveError> {
        let mut results = Vec::with_capacity(names.len());

        for name in names {
            let result = match self.lookup.lookup(name, self.mode, self.timeout) {
                Ok(addresses) => {
                    let addresses: Vec<IpAddr> = addresses
                        .into_iter()
                        .filter(|address| self.mode.accepts(address))
                        .collect();
                    tracing::debug!(name = %name, count = addresses.len(), "resolved");
                    ResolutionResult::new(name.clone(), addresses)
                }
                Err(LookupError::NoSuitableAddress) => {
                    tracing::debug!(name = %name, mode = %self.mode, "no addresses in requested family");
                    ResolutionResult::new(name.clone(), Vec::new())
                }
                Err(LookupError::NotFound) => {
                    tracing::debug!(name = %name, "no such host");
                    ResolutionResult::failed(name.clone(), Failure::NotFound)
                }
                Err(LookupError::Timeout) => {
                    tracing::debug!(name = %name, timeout = ?self.timeout, "lookup timed out");
                    ResolutionResult::failed(name.clone(), Failure::Timeout)
                }
                Err(LookupError::Other(source)) => {
                    return Err(ResolveError {
                        name: name.clone(),
                        source,
                    })
                }
            };
            results.push(result);
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::net::{Ipv4Addr, Ipv6Addr};

    fn name(s: &str) -> DomainName {
        s.parse().unwrap()
    }

    /// Answers with both families regardless of mode and records calls
    struct Unfiltered {
        calls: RefCell<Vec<(String, Duration)>>,
    }

    impl Unfiltered {
        fn new() -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Lookup for Unfiltered {
        fn lookup(
            &self,
            name: &DomainName,
            _mode: ResolutionMode,
            deadline: Duration,
        ) -> Result<Vec<IpAddr>, LookupError> {
            self.calls
                .borrow_mut()
                .push((name.to_string(), deadline));
            match name.as_str() {
                "missing.example" => Err(LookupError::NotFound),
                "slow.example" => Err(LookupError::Timeout),
                "v4only.example" => Err(LookupError::NoSuitableAddress),
                "broken.example" => Err(LookupError::Other("server misbehaving".into())),
                _ => Ok(vec![
                    IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)),
                    IpAddr::V6(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1)),
                    IpAddr::V4(Ipv4Addr::new(192, 0, 2, 2)),
                ]),
            }
        }
    }

    #[test]
    fn filters_addresses_by_family() {
        let lookup = Unfiltered::new();
        let names = [name("a.example"), name("b.example")];

        let v4 = Resolver::new(&lookup)
            .with_mode(ResolutionMode::Ipv4)
            .resolve(&names)
            .unwrap();
        assert!(v4.iter().flat_map(|r| &r.addresses).all(|a| a.is_ipv4()));
        assert_eq!(v4[0].addresses.len(), 2);

        let v6 = Resolver::new(&lookup)
            .with_mode(ResolutionMode::Ipv6)
            .resolve(&names)
            .unwrap();
        assert!(v6.iter().flat_map(|r| &r.addresses).all(|a| a.is_ipv6()));
        assert_eq!(v6[0].addresses.len(), 1);

        let all = Resolver::new(&lookup).resolve(&names).unwrap();
        assert_eq!(all[0].addresses.len(), 3);
        assert_eq!(
            all[0].addresses[0],
            IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)),
            "order of returned addresses is kept"
        );
    }

    #[test]
    fn classified_failures_are_recorded_and_batch_continues() {
        let lookup = Unfiltered::new();
        let names = [
            name("a.example"),
            name("missing.example"),
            name("slow.example"),
            name("v4only.example"),
            name("z.example"),
        ];

        let results = Resolver::new(&lookup).resolve(&names).unwrap();

        assert_eq!(results.len(), 5);
        let got: Vec<_> = results.iter().map(|r| (r.name.as_str(), r.failure)).collect();
        assert_eq!(
            got,
            [
                ("a.example", None),
                ("missing.example", Some(Failure::NotFound)),
                ("slow.example", Some(Failure::Timeout)),
                ("v4only.example", None),
                ("z.example", None),
            ]
        );
        assert!(results[1].addresses.is_empty());
        assert!(results[3].addresses.is_empty());
        assert_eq!(lookup.calls.borrow().len(), 5);
    }

    #[test]
    fn unclassified_error_aborts_remaining_names() {
        let lookup = Unfiltered::new();
        let names = [
            name("a.example"),
            name("broken.example"),
            name("z.example"),
        ];

        let err = Resolver::new(&lookup).resolve(&names).unwrap_err();

        assert_eq!(err.name.as_str(), "broken.example");
        assert_eq!(err.source.to_string(), "server misbehaving");
        let looked_up: Vec<String> = lookup.calls.borrow().iter().map(|(n, _)| n.clone()).collect();
        assert_eq!(looked_up, ["a.example", "broken.example"]);
    }

    #[test]
    fn every_lookup_gets_the_full_timeout() {
        let lookup = Unfiltered::new();
        let names = [name("a.example"), name("b.example"), name("c.example")];

        Resolver::new(&lookup)
            .with_timeout(Duration::from_millis(250))
            .resolve(&names)
            .unwrap();

        assert!(lookup
            .calls
            .borrow()
            .iter()
            .all(|(_, deadline)| *deadline == Duration::from_millis(250)));
    }

    #[test]
    fn empty_input() {
        let lookup = Unfiltered::new();
        let results = Resolver::new(&lookup).resolve(&[]).unwrap();
        assert!(results.is_empty());
        assert!(lookup.calls.borrow().is_empty());
    }

    #[test]
    fn backend_names() {
        let backend: LookupBackend = serde_yaml::from_str("dns").unwrap();
        assert_eq!(backend, LookupBackend::Dns);
        assert_eq!(LookupBackend::default().as_str(), "system");
    }

    #[test]
    fn built_backend_drives_resolver() {
        let lookup = LookupBackend::System.build(DEFAULT_TIMEOUT).unwrap();
        let results = Resolver::new(lookup.as_ref()).resolve(&[]).unwrap();
        assert!(results.is_empty());
    }
}
