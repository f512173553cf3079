//! Storage layer errors

use tessera_domain::{DomainError, EventId, ExpectedVersion};
use thiserror::Error;

/// Errors that can occur in the repository engine
#[derive(Debug, Error)]
pub enum StoreError {
    /// Stream tail did not match the expected version at commit time
    #[error("Wrong expected event version for stream {stream}: expected {expected}, got {actual}")]
    WrongExpectedEventVersion {
        /// Target stream
        stream: String,
        /// Version the caller expected
        expected: ExpectedVersion,
        /// Tail version observed inside the critical section
        actual: i64,
    },

    /// Event id already present in the target stream or the global log
    #[error("Event {event_id} duplicated in stream {stream}")]
    EventDuplicatedInStream {
        /// Duplicated event id
        event_id: EventId,
        /// Target stream
        stream: String,
    },

    /// Event id absent from the global log
    #[error("Event not found: {0}")]
    EventNotFound(EventId),

    /// Domain error passthrough
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}

impl StoreError {
    /// Create a duplicate error
    pub fn duplicated(event_id: EventId, stream: impl Into<String>) -> Self {
        Self::EventDuplicatedInStream {
            event_id,
            stream: stream.into(),
        }
    }

    /// Optimistic concurrency conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::WrongExpectedEventVersion { .. })
    }

    /// Identity collision
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::EventDuplicatedInStream { .. })
    }

    /// Missing event
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::EventNotFound(_))
    }
}

/// Result type for repository operations.
pub type StoreResult<T> = Result<T, StoreError>;
