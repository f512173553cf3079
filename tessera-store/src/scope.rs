//! Scope resolution
//!
//! Turns a stream's ordered records into the view a [`Specification`] asks
//! for. Order of steps: id filter, type filter, direction, start cursor, stop
//! cursor, limit. Filters keep the stream's own order.

use crate::error::{StoreError, StoreResult};
use std::collections::HashSet;
use std::sync::Arc;
use tessera_domain::{EventId, SerializedRecord, Specification};

pub(crate) fn resolve(
    base: &[Arc<SerializedRecord>],
    spec: &Specification,
) -> StoreResult<Vec<Arc<SerializedRecord>>> {
    let ids: Option<HashSet<&EventId>> = spec.with_ids.as_ref().map(|ids| ids.iter().collect());
    let types: Option<HashSet<&str>> =
        spec.with_types.as_ref().map(|types| types.iter().map(String::as_str).collect());

    let mut records: Vec<Arc<SerializedRecord>> = base
        .iter()
        .filter(|record| ids.as_ref().map_or(true, |ids| ids.contains(&record.event_id)))
        .filter(|record| types.as_ref().map_or(true, |types| types.contains(record.event_type.as_str())))
        .cloned()
        .collect();

    if spec.is_backward() {
        records.reverse();
    }

    if let Some(start) = spec.start {
        let position = position_of(&records, start)?;
        records.drain(..=position);
    }

    if let Some(stop) = spec.stop {
        let position = position_of(&records, stop)?;
        records.truncate(position);
    }

    if let Some(limit) = spec.limit {
        records.truncate(limit);
    }

    Ok(records)
}

/// Cursor position inside the filtered view
fn position_of(records: &[Arc<SerializedRecord>], event_id: EventId) -> StoreResult<usize> {
    records
        .iter()
        .position(|record| record.event_id == event_id)
        .ok_or(StoreError::EventNotFound(event_id))
}
