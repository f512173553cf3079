//! Read specifications
//!
//! A [`Specification`] describes what a read should return: which stream,
//! which records, in which direction, and in what shape. It is a plain
//! descriptor; the repository interprets it.

use crate::error::DomainError;
use crate::record::EventId;
use crate::stream::Stream;

/// Read direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Oldest first
    #[default]
    Forward,
    /// Newest first
    Backward,
}

/// Shape of a read result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultShape {
    /// Every matching record, lazily
    #[default]
    All,
    /// Only the first matching record
    First,
    /// Only the last matching record
    Last,
    /// Matching records in fixed-size pages; `None` uses the store's default size
    Batched(Option<usize>),
}

/// Read query descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specification {
    /// Stream to read (or the global pseudo-stream)
    pub stream: Stream,

    /// Keep only these event ids
    pub with_ids: Option<Vec<EventId>>,

    /// Keep only these event types
    pub with_types: Option<Vec<String>>,

    /// Iteration order
    pub direction: Direction,

    /// Start after this event (exclusive)
    pub start: Option<EventId>,

    /// Stop before this event (exclusive)
    pub stop: Option<EventId>,

    /// Maximum number of records
    pub limit: Option<usize>,

    /// How `read` returns the result; ignored by `count`
    pub shape: ResultShape,
}

impl Specification {
    /// Read everything from `stream`, forward
    pub fn new(stream: Stream) -> Self {
        Self {
            stream,
            with_ids: None,
            with_types: None,
            direction: Direction::Forward,
            start: None,
            stop: None,
            limit: None,
            shape: ResultShape::All,
        }
    }

    /// Read everything from the global log, forward
    pub fn global() -> Self {
        Self::new(Stream::global())
    }

    /// Filter by event ids
    pub fn with_ids(mut self, ids: impl IntoIterator<Item = EventId>) -> Self {
        self.with_ids = Some(ids.into_iter().collect());
        self
    }

    /// Filter by event types
    pub fn of_types<S: Into<String>>(mut self, types: impl IntoIterator<Item = S>) -> Self {
        self.with_types = Some(types.into_iter().map(Into::into).collect());
        self
    }

    /// Filter by a single event type
    pub fn of_type(self, event_type: impl Into<String>) -> Self {
        self.of_types([event_type.into()])
    }

    /// Read oldest first
    pub fn forward(mut self) -> Self {
        self.direction = Direction::Forward;
        self
    }

    /// Read newest first
    pub fn backward(mut self) -> Self {
        self.direction = Direction::Backward;
        self
    }

    /// Start reading after `event_id`
    pub fn from(mut self, event_id: EventId) -> Self {
        self.start = Some(event_id);
        self
    }

    /// Stop reading before `event_id`
    pub fn to(mut self, event_id: EventId) -> Self {
        self.stop = Some(event_id);
        self
    }

    /// Limit results
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Return only the first matching record
    pub fn read_first(mut self) -> Self {
        self.shape = ResultShape::First;
        self
    }

    /// Return only the last matching record
    pub fn read_last(mut self) -> Self {
        self.shape = ResultShape::Last;
        self
    }

    /// Return pages of the store's default batch size
    pub fn in_batches(mut self) -> Self {
        self.shape = ResultShape::Batched(None);
        self
    }

    /// Return pages of `batch_size` records
    pub fn in_batches_of(mut self, batch_size: usize) -> Self {
        self.shape = ResultShape::Batched(Some(batch_size));
        self
    }

    /// Whether the result is paged
    pub fn is_batched(&self) -> bool {
        matches!(self.shape, ResultShape::Batched(_))
    }

    /// Whether the read goes newest first
    pub fn is_backward(&self) -> bool {
        self.direction == Direction::Backward
    }

    /// Check the fields that select records, ignoring the result shape
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPageSize` for a zero limit
    pub fn validate_scope(&self) -> Result<(), DomainError> {
        if self.limit == Some(0) {
            return Err(DomainError::InvalidPageSize("limit must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Check page sizes
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPageSize` for a zero limit or batch size
    pub fn validate(&self) -> Result<(), DomainError> {
        self.validate_scope()?;
        if self.shape == ResultShape::Batched(Some(0)) {
            return Err(DomainError::InvalidPageSize(
                "batch size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
