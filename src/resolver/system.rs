//! System resolver backend using getaddrinfo.
//!
//! Resolution goes through the standard library, so it honours the hosts
//! file, nsswitch and the platform resolver configuration. `getaddrinfo`
//! cannot be cancelled, so each lookup runs on a helper thread and the caller
//! waits at most the deadline. A lookup that outlives its deadline finishes in
//! the background and its answer is dropped.

use std::io;
use std::net::{IpAddr, ToSocketAddrs};
use std::thread;
use std::time::Duration;

use crossbeam_channel::RecvTimeoutError;

use super::{Lookup, LookupError};
use crate::domain::{DomainName, ResolutionMode};

/// Messages the platform resolvers use for a name that does not exist
const NOT_FOUND_MESSAGES: &[&str] = &[
    "Name or service not known",
    "No address associated with hostname",
    "nodename nor servname provided",
    "Name does not resolve",
    "No such host is known",
];

/// Messages the platform resolvers use when servers did not answer in time
const TIMEOUT_MESSAGES: &[&str] = &["Temporary failure in name resolution", "timed out"];

/// Lookup through the operating system resolver
#[derive(Debug, Clone, Default)]
pub struct SystemLookup;

impl SystemLookup {
    pub fn new() -> Self {
        Self
    }
}

impl Lookup for SystemLookup {
    fn lookup(
        &self,
        name: &DomainName,
        mode: ResolutionMode,
        deadline: Duration,
    ) -> Result<Vec<IpAddr>, LookupError> {
        let host = name.to_string();
        let (tx, rx) = crossbeam_channel::bounded(1);

        thread::Builder::new()
            .name(format!("getaddrinfo-{}", host))
            .spawn(move || {
                let answer = (host.as_str(), 0u16)
                    .to_socket_addrs()
                    .map(|addrs| addrs.map(|addr| addr.ip()).collect::<Vec<_>>());
                // The receiver is gone once the deadline passed
                let _ = tx.send(answer);
            })
            .map_err(|e| LookupError::Other(Box::new(e)))?;

        let answer = match rx.recv_timeout(deadline) {
            Ok(answer) => answer.map_err(classify)?,
            Err(RecvTimeoutError::Timeout) => return Err(LookupError::Timeout),
            Err(RecvTimeoutError::Disconnected) => {
                return Err(LookupError::Other(
                    "resolver thread exited without an answer".into(),
                ))
            }
        };

        let mut addresses = Vec::with_capacity(answer.len());
        for address in answer {
            if mode.accepts(&address) && !addresses.contains(&address) {
                addresses.push(address);
            }
        }

        if addresses.is_empty() {
            return Err(LookupError::NoSuitableAddress);
        }

        Ok(addresses)
    }
}

/// Maps a getaddrinfo failure onto a lookup outcome
fn classify(err: io::Error) -> LookupError {
    let message = err.to_string();

    if err.kind() == io::ErrorKind::TimedOut || TIMEOUT_MESSAGES.iter().any(|m| message.contains(m)) {
        return LookupError::Timeout;
    }

    if err.kind() == io::ErrorKind::NotFound || NOT_FOUND_MESSAGES.iter().any(|m| message.contains(m)) {
        return LookupError::NotFound;
    }

    LookupError::Other(Box::new(err))
}
