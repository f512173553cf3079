//! Tessera Storage Layer
//!
//! Event repository engine: a single global log of every appended record,
//! named streams indexing into it, optimistic concurrency on appends,
//! cross-stream linking, corrective updates, and filtered reads.
//!
//! # Architecture
//!
//! - **Repository trait**: Defines the storage interface (port)
//! - **In-memory repository**: Reference implementation
//! - **Scope resolution**: Filtering pipeline shared by `read` and `count`
//! - **Batch enumerator**: Lazy pagination for batched reads
//!
//! # Usage
//!
//! ```rust
//! use tessera_domain::{ExpectedVersion, Record, Specification, Stream};
//! use tessera_store::{EventRepository, InMemoryRepository};
//!
//! #[tokio::main]
//! async fn main() {
//!     let repo = InMemoryRepository::new();
//!     let stream = Stream::new("Order$1").unwrap();
//!
//!     let placed = Record::new("OrderPlaced", &b"{\"sku\":\"A-1\"}"[..]);
//!     repo.append_to_stream(vec![placed], &stream, ExpectedVersion::None)
//!         .await
//!         .unwrap();
//!
//!     let count = repo.count(&Specification::new(stream)).await.unwrap();
//!     println!("Records in stream: {}", count);
//! }
//! ```

#![warn(clippy::all)]

// Modules
mod batch;
mod config;
mod error;
mod memory;
mod read;
mod repository;
mod scope;

// Re-exports
pub use batch::{BatchEnumerator, Batches, PageFn};
pub use config::{ConfigError, Environment, StoreConfig, DEFAULT_BATCH_SIZE};
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryRepository;
pub use read::{ReadResult, Records};
pub use repository::EventRepository;
