//! # Archive Media Tools
//!
//! Maintenance tools for a scanned-document archive.
//!
//! - A batch re-compressor that shrinks JPEG/PNG scans without changing their
//!   pixel dimensions and writes a manifest for the viewer
//! - A movie-poster fetcher that saves the best-matching artwork for a title
//!
//! ## Architecture
//! - `core` - Scanning, compression, manifest and cover logic
//! - `events` - Event-driven progress reporting
//! - `error` - Error types with the offending path or title
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{MediaToolsError, Result};

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the binary.
///
/// Logs go to stderr so stdout only carries result lines. Honors `RUST_LOG`,
/// defaulting to `warn`. Calling it twice is harmless.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
