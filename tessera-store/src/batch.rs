//! Lazy fixed-size pagination
//!
//! [`BatchEnumerator`] walks an ordered result set of known size in pages of
//! `batch_size`, asking a page-fetch function for each one only when the
//! iterator reaches it. Nothing is cached: iterating again fetches again.

use crate::error::StoreResult;
use std::fmt;
use std::sync::Arc;
use tessera_domain::DomainError;

/// Page fetch: `(offset, limit)` to at most `limit` ordered elements
pub type PageFn<T> = dyn Fn(usize, usize) -> StoreResult<Vec<T>> + Send + Sync;

/// Lazy, finite sequence of pages
pub struct BatchEnumerator<T> {
    batch_size: usize,
    total_count: usize,
    page: Arc<PageFn<T>>,
}

impl<T> BatchEnumerator<T> {
    /// Create an enumerator over `total_count` elements
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPageSize` if `batch_size` is 0
    pub fn new<F>(batch_size: usize, total_count: usize, page: F) -> StoreResult<Self>
    where
        F: Fn(usize, usize) -> StoreResult<Vec<T>> + Send + Sync + 'static,
    {
        if batch_size == 0 {
            return Err(DomainError::InvalidPageSize("batch size must be at least 1".to_string()).into());
        }
        Ok(Self {
            batch_size,
            total_count,
            page: Arc::new(page),
        })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// Number of pages a full iteration yields
    pub fn batch_count(&self) -> usize {
        self.total_count.div_ceil(self.batch_size)
    }

    /// Iterate pages from the beginning
    pub fn iter(&self) -> Batches<T> {
        Batches {
            page: Arc::clone(&self.page),
            batch_size: self.batch_size,
            total_count: self.total_count,
            offset: 0,
            done: false,
        }
    }
}

impl<T> fmt::Debug for BatchEnumerator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchEnumerator")
            .field("batch_size", &self.batch_size)
            .field("total_count", &self.total_count)
            .finish_non_exhaustive()
    }
}

impl<T> IntoIterator for BatchEnumerator<T> {
    type Item = StoreResult<Vec<T>>;
    type IntoIter = Batches<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> IntoIterator for &BatchEnumerator<T> {
    type Item = StoreResult<Vec<T>>;
    type IntoIter = Batches<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Forward-only page iterator
pub struct Batches<T> {
    page: Arc<PageFn<T>>,
    batch_size: usize,
    total_count: usize,
    offset: usize,
    done: bool,
}

impl<T> Iterator for Batches<T> {
    type Item = StoreResult<Vec<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.offset >= self.total_count {
            return None;
        }

        let result = (self.page)(self.offset, self.batch_size);
        self.offset += self.batch_size;

        match result {
            // Source shrank below total_count; nothing more to yield
            Ok(batch) if batch.is_empty() => {
                self.done = true;
                None
            },
            Ok(batch) => Some(Ok(batch)),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            },
        }
    }
}
