#![forbid(unsafe_code)]
#![expect(
    clippy::missing_panics_doc,
    reason = "test utility crate, panics are assertion failures"
)]

//! Shared test utilities for the sitar workspace.

pub mod rng;
pub mod synthetic;

pub use rng::Xorshift64;
pub use synthetic::{
    Failure, SeekLanding, SourceCounters, Stamps, SyntheticSource, pattern_byte, pattern_bytes,
};
use tracing_subscriber::EnvFilter;

/// Install a test-writer subscriber once per process.
///
/// Level comes from `RUST_LOG`, `warn` otherwise.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
