//! Tessera Domain Layer
//!
//! Pure value types with zero I/O dependencies.
//! Contains the records, stream handles, concurrency tokens and read
//! specifications the repository engine operates on.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Public modules
pub mod error;
pub mod expected_version;
pub mod record;
pub mod serializer;
pub mod specification;
pub mod stream;

// Re-export commonly used types
pub use error::DomainError;
pub use expected_version::{ExpectedVersion, POSITION_DEFAULT};
pub use record::{EventId, Record, SerializedRecord};
pub use serializer::{NullSerializer, Serializer};
pub use specification::{Direction, ResultShape, Specification};
pub use stream::{Stream, GLOBAL_STREAM};
