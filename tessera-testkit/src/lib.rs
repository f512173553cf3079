//! Test helpers for Tessera repository tests.
//!
//! Provides record builders, stream seeding, tracing setup, and a harness
//! that races concurrent writers against one stream.

mod helpers;
mod race;

pub use helpers::{record, record_with, seed_stream, stream};
pub use race::{race_appends, race_read_then_append, RaceOutcome};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a test-friendly tracing subscriber.
///
/// Honours `RUST_LOG`; defaults to debug output from the store.
/// Safe to call from every test: only the first call installs anything.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tessera_store=debug"));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_test_writer())
        .with(filter)
        .try_init();
}
