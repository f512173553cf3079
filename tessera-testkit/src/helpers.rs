//! Record and stream builders.

use anyhow::Result;
use serde_json::{json, Value};
use tessera_domain::{ExpectedVersion, Record, Stream};
use tessera_store::EventRepository;

/// Stream handle from a name known to be valid.
pub fn stream(name: &str) -> Stream {
    Stream::new(name).unwrap_or_else(|e| panic!("invalid test stream {:?}: {}", name, e))
}

/// Record of `event_type` with a small JSON payload naming the type.
pub fn record(event_type: &str) -> Record {
    record_with(event_type, json!({ "type": event_type }))
}

/// Record of `event_type` carrying `payload` as JSON bytes.
pub fn record_with(event_type: &str, payload: Value) -> Record {
    Record::new(event_type, payload.to_string())
}

/// Append one record per event type to `stream`, in order.
///
/// Returns the appended records so tests can refer to their ids.
pub async fn seed_stream<R>(repo: &R, stream: &Stream, event_types: &[&str]) -> Result<Vec<Record>>
where
    R: EventRepository + ?Sized,
{
    let records: Vec<Record> = event_types.iter().map(|event_type| record(event_type)).collect();
    repo.append_to_stream(records.clone(), stream, ExpectedVersion::Any).await?;
    Ok(records)
}
