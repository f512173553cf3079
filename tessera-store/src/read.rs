//! Read results

use crate::batch::BatchEnumerator;
use crate::error::{StoreError, StoreResult};
use std::fmt;
use std::sync::Arc;
use tessera_domain::{Record, SerializedRecord, Serializer};

/// Outcome of a repository read, shaped by the specification
#[derive(Debug)]
pub enum ReadResult {
    /// `read_first` / `read_last`
    Record(Option<Record>),
    /// Every matching record, deserialized on demand
    Records(Records),
    /// Matching records in pages
    Batches(BatchEnumerator<Record>),
}

impl ReadResult {
    /// Collapse to a single record (the first one for sequences)
    pub fn into_record(self) -> StoreResult<Option<Record>> {
        match self {
            ReadResult::Record(record) => Ok(record),
            ReadResult::Records(mut records) => records.next().transpose(),
            ReadResult::Batches(batches) => match batches.iter().next() {
                Some(page) => Ok(page?.into_iter().next()),
                None => Ok(None),
            },
        }
    }

    /// Collect every record, flattening pages
    pub fn into_records(self) -> StoreResult<Vec<Record>> {
        match self {
            ReadResult::Record(record) => Ok(record.into_iter().collect()),
            ReadResult::Records(records) => records.collect(),
            ReadResult::Batches(batches) => {
                let mut all = Vec::with_capacity(batches.total_count());
                for page in &batches {
                    all.extend(page?);
                }
                Ok(all)
            },
        }
    }

    /// Page enumerator, if the read was batched
    pub fn into_batches(self) -> Option<BatchEnumerator<Record>> {
        match self {
            ReadResult::Batches(batches) => Some(batches),
            _ => None,
        }
    }
}

/// Lazy sequence over a snapshot of stored records
///
/// The snapshot is taken when the read resolves; later writes are not seen.
pub struct Records {
    serializer: Arc<dyn Serializer>,
    inner: std::vec::IntoIter<Arc<SerializedRecord>>,
}

impl Records {
    pub(crate) fn new(serializer: Arc<dyn Serializer>, snapshot: Vec<Arc<SerializedRecord>>) -> Self {
        Self {
            serializer,
            inner: snapshot.into_iter(),
        }
    }
}

impl Iterator for Records {
    type Item = StoreResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|record| record.deserialize(self.serializer.as_ref()).map_err(StoreError::from))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Records {}

impl fmt::Debug for Records {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Records").field("remaining", &self.inner.len()).finish()
    }
}
