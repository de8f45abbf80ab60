//! Domain models for dns-lookuper
//!
//! Names, name sets and resolution results, without any I/O concerns.

mod name;
mod names;
mod result;

pub use name::{DomainName, NameError, COMMENT_MARKER};
pub use names::NameSet;
pub use result::{Failure, ResolutionMode, ResolutionResult};
