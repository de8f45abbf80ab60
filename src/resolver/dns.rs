//! DNS client backend using hickory-dns.
//!
//! Queries the name servers from the system configuration directly: A
//! records for `ipv4`, AAAA for `ipv6`, both for `all`. The client runs on a
//! private current-thread runtime and each lookup blocks until it answers or
//! its deadline passes.

use std::net::IpAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use hickory_resolver::config::{LookupIpStrategy, ResolverConfig};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::{ResolveError, TokioResolver};
use tokio::runtime::{Builder, Runtime};

use super::{Lookup, LookupError};
use crate::domain::{DomainName, ResolutionMode};

/// Lookup through the hickory-dns client
pub struct DnsLookup {
    runtime: Runtime,
    resolver: TokioResolver,
}

impl DnsLookup {
    /// Creates a client from the system DNS configuration
    ///
    /// Falls back to the library defaults when the system configuration
    /// cannot be read. The client's own query timeout is set above
    /// `timeout` so the per-lookup deadline is the one that fires.
    pub fn new(timeout: Duration) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to start DNS client runtime")?;

        let resolver = {
            let _guard = runtime.enter();

            let mut builder = match TokioResolver::builder_tokio() {
                Ok(builder) => {
                    tracing::debug!("using system DNS configuration");
                    builder
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read system DNS config, using defaults");
                    TokioResolver::builder_with_config(
                        ResolverConfig::default(),
                        TokioConnectionProvider::default(),
                    )
                }
            };

            let options = builder.options_mut();
            options.ip_strategy = LookupIpStrategy::Ipv4AndIpv6;
            options.timeout = timeout.saturating_mul(2);

            builder.build()
        };

        Ok(Self { runtime, resolver })
    }

    async fn query(&self, host: &str, mode: ResolutionMode) -> Result<Vec<IpAddr>, ResolveError> {
        let addresses = match mode {
            ResolutionMode::Ipv4 => self
                .resolver
                .ipv4_lookup(host)
                .await?
                .iter()
                .map(|record| IpAddr::V4(record.0))
                .collect(),
            ResolutionMode::Ipv6 => self
                .resolver
                .ipv6_lookup(host)
                .await?
                .iter()
                .map(|record| IpAddr::V6(record.0))
                .collect(),
            ResolutionMode::All => self.resolver.lookup_ip(host).await?.iter().collect(),
        };
        Ok(addresses)
    }
}

impl Lookup for DnsLookup {
    fn lookup(
        &self,
        name: &DomainName,
        mode: ResolutionMode,
        deadline: Duration,
    ) -> Result<Vec<IpAddr>, LookupError> {
        let host = name.as_str();
        tracing::debug!(name = %host, mode = %mode, "resolving via hickory-dns");

        let answer = self
            .runtime
            .block_on(async { tokio::time::timeout(deadline, self.query(host, mode)).await });

        match answer {
            Err(_elapsed) => Err(LookupError::Timeout),
            Ok(Err(e)) => Err(classify(e)),
            Ok(Ok(addresses)) if addresses.is_empty() => Err(LookupError::NoSuitableAddress),
            Ok(Ok(addresses)) => Ok(addresses),
        }
    }
}

/// Maps a hickory-dns failure onto a lookup outcome
fn classify(err: ResolveError) -> LookupError {
    if err.is_nx_domain() {
        LookupError::NotFound
    } else if err.is_no_records_found() {
        LookupError::NoSuitableAddress
    } else {
        LookupError::Other(Box::new(err))
    }
}
