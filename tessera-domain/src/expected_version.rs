//! Optimistic concurrency tokens

use crate::error::DomainError;
use crate::stream::Stream;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tail version of an empty or nonexistent stream
pub const POSITION_DEFAULT: i64 = -1;

/// Caller's belief about a stream's current tail position
///
/// A stream holding `k` records has tail version `k - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpectedVersion {
    /// No check; the tail observed at commit time is accepted
    Any,
    /// Stream must be empty at commit time
    None,
    /// Writers are serialized externally; tail is read before the commit
    Auto,
    /// Tail must equal this version at commit time
    Exact(i64),
}

impl ExpectedVersion {
    /// Whether the tail is recomputed inside the critical section
    pub fn is_any(&self) -> bool {
        matches!(self, ExpectedVersion::Any)
    }

    /// Whether the tail is read from the stream before committing
    pub fn is_auto(&self) -> bool {
        matches!(self, ExpectedVersion::Auto)
    }

    /// Resolve to an integer version for `stream`
    ///
    /// `tail` reports the stream's current tail version. It is consulted for
    /// `Auto` and `Any`; for `Any` the caller recomputes it again under its
    /// own lock.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidExpectedVersion` if the global stream is
    /// targeted with anything other than `Any`, or if an exact version is
    /// below `POSITION_DEFAULT`.
    pub fn resolve_for<F>(&self, stream: &Stream, tail: F) -> Result<i64, DomainError>
    where
        F: FnOnce(&Stream) -> i64,
    {
        if stream.is_global() && !self.is_any() {
            return Err(DomainError::InvalidExpectedVersion(format!(
                "{} cannot be used with the global stream",
                self
            )));
        }

        match self {
            ExpectedVersion::Exact(version) if *version < POSITION_DEFAULT => {
                Err(DomainError::InvalidExpectedVersion(format!(
                    "version {} is below {}",
                    version, POSITION_DEFAULT
                )))
            },
            ExpectedVersion::Exact(version) => Ok(*version),
            ExpectedVersion::None => Ok(POSITION_DEFAULT),
            ExpectedVersion::Auto | ExpectedVersion::Any => Ok(tail(stream)),
        }
    }
}

impl From<i64> for ExpectedVersion {
    fn from(version: i64) -> Self {
        ExpectedVersion::Exact(version)
    }
}

impl fmt::Display for ExpectedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedVersion::Any => write!(f, "any"),
            ExpectedVersion::None => write!(f, "none"),
            ExpectedVersion::Auto => write!(f, "auto"),
            ExpectedVersion::Exact(version) => write!(f, "{}", version),
        }
    }
}
