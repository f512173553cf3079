//! Repository trait definition (Port)
//!
//! Every storage backend implements this trait with the same atomicity and
//! conflict semantics. The in-memory implementation is the reference.

use crate::error::StoreResult;
use crate::read::ReadResult;
use async_trait::async_trait;
use tessera_domain::{EventId, ExpectedVersion, Record, Specification, Stream};

/// Event storage: streams, the global log, and reads over both
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Append new records to a stream and to the global log
    ///
    /// The batch commits as a unit. On any error neither the stream nor the
    /// global log is changed.
    ///
    /// # Errors
    /// - `WrongExpectedEventVersion` if the tail does not match
    /// - `EventDuplicatedInStream` if an id is repeated in the batch, already
    ///   in the stream, or already in the global log
    async fn append_to_stream(
        &self,
        records: Vec<Record>,
        stream: &Stream,
        expected_version: ExpectedVersion,
    ) -> StoreResult<()>;

    /// Attach already-stored events to another stream
    ///
    /// # Errors
    /// - `EventNotFound` if an id is not in the global log
    /// - `WrongExpectedEventVersion` if the tail does not match
    /// - `EventDuplicatedInStream` if an id is repeated or already in the stream
    async fn link_to_stream(
        &self,
        event_ids: Vec<EventId>,
        stream: &Stream,
        expected_version: ExpectedVersion,
    ) -> StoreResult<()>;

    /// Remove a stream's index entry; its records stay in the global log
    async fn delete_stream(&self, stream: &Stream) -> StoreResult<()>;

    /// Whether the global log holds `event_id`
    async fn has_event(&self, event_id: EventId) -> StoreResult<bool>;

    /// Newest record of a stream
    async fn last_stream_event(&self, stream: &Stream) -> StoreResult<Option<Record>>;

    /// Read according to `spec`
    async fn read(&self, spec: &Specification) -> StoreResult<ReadResult>;

    /// Number of records `spec` selects (result shape is ignored)
    async fn count(&self, spec: &Specification) -> StoreResult<usize>;

    /// Replace content of stored events, keeping their original timestamp
    ///
    /// # Errors
    /// - `EventNotFound` if any id is not in the global log
    async fn update_messages(&self, records: Vec<Record>) -> StoreResult<()>;

    /// Named streams containing `event_id`, by append or by link
    async fn streams_of(&self, event_id: EventId) -> StoreResult<Vec<Stream>>;
}
