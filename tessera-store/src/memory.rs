//! In-memory repository implementation
//!
//! Reference backend for the [`EventRepository`] contract.
//! One `RwLock` guards the global log and the stream index: writers hold it
//! exclusively for the whole validate-then-commit, readers share it while the
//! scope is resolved, so a committed batch is visible all at once or not at all.

use crate::batch::BatchEnumerator;
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::read::{ReadResult, Records};
use crate::repository::EventRepository;
use crate::scope;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tessera_domain::{
    EventId, ExpectedVersion, NullSerializer, Record, ResultShape, SerializedRecord, Serializer,
    Specification, Stream, POSITION_DEFAULT,
};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// In-memory event repository
pub struct InMemoryRepository {
    state: RwLock<State>,
    serializer: Arc<dyn Serializer>,
    config: StoreConfig,
}

/// Records shared by the global log and every stream that holds them
#[derive(Default)]
struct State {
    global: Vec<Arc<SerializedRecord>>,
    /// event id -> index in `global`
    positions: HashMap<EventId, usize>,
    streams: BTreeMap<String, Vec<Arc<SerializedRecord>>>,
}

/// Records about to be committed
enum Batch {
    Append(Vec<SerializedRecord>),
    Link(Vec<EventId>),
}

impl State {
    /// The global log doubles as the global stream's sequence
    fn stream_records(&self, stream: &Stream) -> &[Arc<SerializedRecord>] {
        if stream.is_global() {
            return &self.global;
        }
        self.streams.get(stream.name()).map(Vec::as_slice).unwrap_or(&[])
    }

    fn last_stream_version(&self, stream: &Stream) -> i64 {
        POSITION_DEFAULT + self.stream_records(stream).len() as i64
    }

    fn find(&self, event_id: &EventId) -> Option<&Arc<SerializedRecord>> {
        self.positions.get(event_id).and_then(|&position| self.global.get(position))
    }
}

impl InMemoryRepository {
    /// Create an empty repository with the identity serializer
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create an empty repository with explicit configuration
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            state: RwLock::new(State::default()),
            serializer: Arc::new(NullSerializer),
            config,
        }
    }

    /// Replace the payload serializer
    pub fn with_serializer(mut self, serializer: Arc<dyn Serializer>) -> Self {
        self.serializer = serializer;
        self
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn deserialize(&self, record: &SerializedRecord) -> StoreResult<Record> {
        Ok(record.deserialize(self.serializer.as_ref())?)
    }

    /// Resolve the expected version, then commit under the write lock
    ///
    /// `Auto` is resolved before the write lock is taken: concurrent writers
    /// that are not serialized externally can lose the race and get
    /// `WrongExpectedEventVersion`. `Any` is re-resolved inside the lock.
    async fn add_to_stream(
        &self,
        batch: Batch,
        stream: &Stream,
        expected_version: ExpectedVersion,
    ) -> StoreResult<()> {
        let resolved = {
            let state = self.state.read().await;
            expected_version.resolve_for(stream, |s| state.last_stream_version(s))?
        };

        // Widens the window between resolution and commit for race tests
        #[cfg(any(test, feature = "test-util"))]
        tokio::task::yield_now().await;

        let mut state = self.state.write().await;
        let resolved = if expected_version.is_any() {
            state.last_stream_version(stream)
        } else {
            resolved
        };
        Self::commit(&mut state, batch, stream, expected_version, resolved)
    }

    /// Validate the whole batch, then apply it. Nothing is written on error.
    fn commit(
        state: &mut State,
        batch: Batch,
        stream: &Stream,
        expected_version: ExpectedVersion,
        resolved: i64,
    ) -> StoreResult<()> {
        let actual = state.last_stream_version(stream);
        if actual != resolved {
            warn!(
                stream = %stream,
                expected = %expected_version,
                actual = actual,
                "Wrong expected event version"
            );
            return Err(StoreError::WrongExpectedEventVersion {
                stream: stream.name().to_string(),
                expected: expected_version,
                actual,
            });
        }

        let (records, include_global) = match batch {
            Batch::Append(records) => (records.into_iter().map(Arc::new).collect::<Vec<_>>(), true),
            Batch::Link(event_ids) => {
                let records = event_ids
                    .into_iter()
                    .map(|event_id| {
                        state.find(&event_id).cloned().ok_or(StoreError::EventNotFound(event_id))
                    })
                    .collect::<StoreResult<Vec<_>>>()?;
                (records, false)
            },
        };

        let mut batch_ids = HashSet::with_capacity(records.len());
        for record in &records {
            if !batch_ids.insert(record.event_id) {
                return Err(Self::duplicated(record.event_id, stream));
            }
        }

        if let Some(existing) = state
            .stream_records(stream)
            .iter()
            .find(|record| batch_ids.contains(&record.event_id))
        {
            return Err(Self::duplicated(existing.event_id, stream));
        }

        if include_global {
            if let Some(record) = records.iter().find(|r| state.positions.contains_key(&r.event_id)) {
                return Err(Self::duplicated(record.event_id, stream));
            }
        }

        let count = records.len();
        if include_global {
            for record in &records {
                state.positions.insert(record.event_id, state.global.len());
                state.global.push(Arc::clone(record));
            }
        }
        if !stream.is_global() && !records.is_empty() {
            state.streams.entry(stream.name().to_string()).or_default().extend(records);
        }

        debug!(
            stream = %stream,
            count = count,
            version = state.last_stream_version(stream),
            global = include_global,
            "Records committed"
        );

        Ok(())
    }

    fn duplicated(event_id: EventId, stream: &Stream) -> StoreError {
        warn!(event_id = %event_id, stream = %stream, "Event duplicated in stream");
        StoreError::duplicated(event_id, stream.name())
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventRepository for InMemoryRepository {
    async fn append_to_stream(
        &self,
        records: Vec<Record>,
        stream: &Stream,
        expected_version: ExpectedVersion,
    ) -> StoreResult<()> {
        let serialized = records
            .iter()
            .map(|record| record.serialize(self.serializer.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        self.add_to_stream(Batch::Append(serialized), stream, expected_version).await
    }

    async fn link_to_stream(
        &self,
        event_ids: Vec<EventId>,
        stream: &Stream,
        expected_version: ExpectedVersion,
    ) -> StoreResult<()> {
        {
            let state = self.state.read().await;
            if let Some(missing) = event_ids.iter().find(|id| !state.positions.contains_key(id)) {
                return Err(StoreError::EventNotFound(*missing));
            }
        }

        self.add_to_stream(Batch::Link(event_ids), stream, expected_version).await
    }

    async fn delete_stream(&self, stream: &Stream) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if let Some(records) = state.streams.remove(stream.name()) {
            debug!(stream = %stream, count = records.len(), "Stream deleted");
        }
        Ok(())
    }

    async fn has_event(&self, event_id: EventId) -> StoreResult<bool> {
        let state = self.state.read().await;
        Ok(state.positions.contains_key(&event_id))
    }

    async fn last_stream_event(&self, stream: &Stream) -> StoreResult<Option<Record>> {
        let last = {
            let state = self.state.read().await;
            state.stream_records(stream).last().cloned()
        };
        last.map(|record| self.deserialize(&record)).transpose()
    }

    async fn read(&self, spec: &Specification) -> StoreResult<ReadResult> {
        spec.validate()?;

        let records = {
            let state = self.state.read().await;
            scope::resolve(state.stream_records(&spec.stream), spec)?
        };

        match spec.shape {
            ResultShape::Batched(batch_size) => {
                let batch_size = batch_size.unwrap_or(self.config.default_batch_size);
                let total_count = records.len();
                let serializer = Arc::clone(&self.serializer);
                let snapshot: Arc<[Arc<SerializedRecord>]> = records.into();

                let batches = BatchEnumerator::<Record>::new(batch_size, total_count, move |offset, limit| {
                    snapshot
                        .iter()
                        .skip(offset)
                        .take(limit)
                        .map(|record| record.deserialize(serializer.as_ref()).map_err(StoreError::from))
                        .collect()
                })?;
                Ok(ReadResult::Batches(batches))
            },
            ResultShape::First => {
                let first = records.first().map(|record| self.deserialize(record)).transpose()?;
                Ok(ReadResult::Record(first))
            },
            ResultShape::Last => {
                let last = records.last().map(|record| self.deserialize(record)).transpose()?;
                Ok(ReadResult::Record(last))
            },
            ResultShape::All => Ok(ReadResult::Records(Records::new(Arc::clone(&self.serializer), records))),
        }
    }

    async fn count(&self, spec: &Specification) -> StoreResult<usize> {
        spec.validate_scope()?;

        let state = self.state.read().await;
        Ok(scope::resolve(state.stream_records(&spec.stream), spec)?.len())
    }

    async fn update_messages(&self, records: Vec<Record>) -> StoreResult<()> {
        let serialized = records
            .iter()
            .map(|record| record.serialize(self.serializer.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut guard = self.state.write().await;
        let state = &mut *guard;

        if let Some(missing) = serialized.iter().find(|r| !state.positions.contains_key(&r.event_id)) {
            return Err(StoreError::EventNotFound(missing.event_id));
        }

        for mut record in serialized {
            let position = state
                .positions
                .get(&record.event_id)
                .copied()
                .ok_or(StoreError::EventNotFound(record.event_id))?;

            // Original system time survives every correction
            record.timestamp = state.global[position].timestamp.clone();
            let replacement = Arc::new(record);

            state.global[position] = Arc::clone(&replacement);
            for stream_records in state.streams.values_mut() {
                if let Some(slot) = stream_records.iter_mut().find(|r| r.event_id == replacement.event_id) {
                    *slot = Arc::clone(&replacement);
                }
            }

            debug!(event_id = %replacement.event_id, event_type = %replacement.event_type, "Record updated");
        }

        Ok(())
    }

    async fn streams_of(&self, event_id: EventId) -> StoreResult<Vec<Stream>> {
        let state = self.state.read().await;
        let streams = state
            .streams
            .iter()
            .filter(|(_, records)| records.iter().any(|r| r.event_id == event_id))
            .map(|(name, _)| Stream::new(name.as_str()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(streams)
    }
}

// =============================================================================
// Tests
// =============================================================================
