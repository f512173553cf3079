//! Event records
//!
//! [`Record`] is the event as the caller hands it over; [`SerializedRecord`]
//! is the storage form the repository keeps in its logs.

use crate::error::DomainError;
use crate::serializer::Serializer;
use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Globally unique event identifier
pub type EventId = Uuid;

/// Fractional-second digits kept for timestamps
const TIMESTAMP_PRECISION: u16 = 6;

/// Immutable event value
///
/// # Invariants
/// - `event_id` is unique across the whole store once committed
/// - `timestamp` never changes after the first commit; `valid_at` may
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Store-wide unique id
    pub event_id: EventId,
    /// Event type name, used by type filters
    pub event_type: String,
    /// Opaque payload
    pub data: Bytes,
    /// Opaque metadata
    pub metadata: Bytes,
    /// System time the event was recorded
    pub timestamp: DateTime<Utc>,
    /// Business time the event applies to
    pub valid_at: DateTime<Utc>,
}

impl Record {
    /// Create a new record with a fresh id, empty metadata, and
    /// `valid_at == timestamp == now`
    pub fn new(event_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let now = Utc::now().trunc_subsecs(TIMESTAMP_PRECISION);
        Self {
            event_id: Uuid::now_v7(),
            event_type: event_type.into(),
            data: data.into(),
            metadata: Bytes::new(),
            timestamp: now,
            valid_at: now,
        }
    }

    /// Set event ID
    pub fn with_event_id(mut self, event_id: EventId) -> Self {
        self.event_id = event_id;
        self
    }

    /// Set metadata
    pub fn with_metadata(mut self, metadata: impl Into<Bytes>) -> Self {
        self.metadata = metadata.into();
        self
    }

    /// Set system timestamp
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Set business time
    pub fn with_valid_at(mut self, valid_at: DateTime<Utc>) -> Self {
        self.valid_at = valid_at;
        self
    }

    /// Convert to storage form, passing payloads through `serializer`
    pub fn serialize(&self, serializer: &dyn Serializer) -> Result<SerializedRecord, DomainError> {
        Ok(SerializedRecord {
            event_id: self.event_id,
            event_type: self.event_type.clone(),
            data: serializer.dump(&self.data)?,
            metadata: serializer.dump(&self.metadata)?,
            timestamp: encode_time(&self.timestamp),
            valid_at: encode_time(&self.valid_at),
        })
    }
}

/// Storage form of a record
///
/// Payloads are as produced by [`Serializer::dump`]; timestamps are RFC 3339
/// strings with microsecond precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedRecord {
    /// Store-wide unique id
    pub event_id: EventId,
    /// Event type name
    pub event_type: String,
    /// Payload after [`Serializer::dump`]
    pub data: Bytes,
    /// Metadata after [`Serializer::dump`]
    pub metadata: Bytes,
    /// System time, RFC 3339
    pub timestamp: String,
    /// Business time, RFC 3339
    pub valid_at: String,
}

impl SerializedRecord {
    /// Convert back to a [`Record`], passing payloads through `serializer`
    pub fn deserialize(&self, serializer: &dyn Serializer) -> Result<Record, DomainError> {
        Ok(Record {
            event_id: self.event_id,
            event_type: self.event_type.clone(),
            data: serializer.load(&self.data)?,
            metadata: serializer.load(&self.metadata)?,
            timestamp: decode_time(&self.timestamp)?,
            valid_at: decode_time(&self.valid_at)?,
        })
    }
}

fn encode_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_time(value: &str) -> Result<DateTime<Utc>, DomainError> {
    DateTime::parse_from_rfc3339(value)
        .map(|time| time.with_timezone(&Utc))
        .map_err(|e| DomainError::Serialization(format!("invalid timestamp {:?}: {}", value, e)))
}
