//! Lookup from a fixed table of answers.
//!
//! Every name not in the table is reported as not found. Answers are
//! filtered by the requested family like a real resolver would, and each
//! lookup is recorded so callers can check what was asked and in which order.

use std::cell::RefCell;
use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Duration;

use super::{Lookup, LookupError};
use crate::domain::{DomainName, ResolutionMode};

#[derive(Debug, Clone)]
enum Answer {
    Addresses(Vec<IpAddr>),
    NotFound,
    Timeout,
    Failure(String),
}

/// Lookup that answers from an in-memory table
#[derive(Debug, Default)]
pub struct StaticLookup {
    answers: HashMap<String, Answer>,
    queries: RefCell<Vec<String>>,
}

impl StaticLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `name` with `addresses`
    pub fn with_addresses(
        mut self,
        name: &str,
        addresses: impl IntoIterator<Item = IpAddr>,
    ) -> Self {
        self.answers.insert(
            name.to_string(),
            Answer::Addresses(addresses.into_iter().collect()),
        );
        self
    }

    /// Reports `name` as a non-existent domain
    pub fn with_not_found(mut self, name: &str) -> Self {
        self.answers.insert(name.to_string(), Answer::NotFound);
        self
    }

    /// Reports `name` as timed out
    pub fn with_timeout(mut self, name: &str) -> Self {
        self.answers.insert(name.to_string(), Answer::Timeout);
        self
    }

    /// Fails `name` with an error that cannot be classified
    pub fn with_failure(mut self, name: &str, message: &str) -> Self {
        self.answers
            .insert(name.to_string(), Answer::Failure(message.to_string()));
        self
    }

    /// Names looked up so far, in order
    pub fn queries(&self) -> Vec<String> {
        self.queries.borrow().clone()
    }
}

impl Lookup for StaticLookup {
    fn lookup(
        &self,
        name: &DomainName,
        mode: ResolutionMode,
        _deadline: Duration,
    ) -> Result<Vec<IpAddr>, LookupError> {
        self.queries.borrow_mut().push(name.to_string());

        match self.answers.get(name.as_str()) {
            None | Some(Answer::NotFound) => Err(LookupError::NotFound),
            Some(Answer::Timeout) => Err(LookupError::Timeout),
            Some(Answer::Failure(message)) => Err(LookupError::Other(message.clone().into())),
            Some(Answer::Addresses(addresses)) => {
                let kept: Vec<IpAddr> = addresses
                    .iter()
                    .filter(|address| mode.accepts(address))
                    .copied()
                    .collect();
                if kept.is_empty() {
                    Err(LookupError::NoSuitableAddress)
                } else {
                    Ok(kept)
                }
            }
        }
    }
}
