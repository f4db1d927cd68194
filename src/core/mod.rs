//! # Core Module
//!
//! The presentation-agnostic engine behind both tools.
//!
//! ## Modules
//! - `scanner` - Discovers JPEG/PNG files in a directory tree
//! - `compressor` - Re-encodes a single image
//! - `pipeline` - Runs the compressor over a scan on a worker pool
//! - `manifest` - Lists the produced images for the scan viewer
//! - `covers` - Searches for and downloads movie posters

pub mod compressor;
pub mod covers;
pub mod manifest;
pub mod pipeline;
pub mod scanner;

// Re-export commonly used types
pub use compressor::{CompressionOptions, ImageTaskResult, TaskOutcome};
pub use covers::{CoverFetcher, MovieQuery, SavedCover};
pub use manifest::ManifestFiles;
pub use pipeline::{CompressPipeline, CompressReport};
pub use scanner::ImageFile;
