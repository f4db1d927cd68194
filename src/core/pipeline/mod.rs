//! # Pipeline Module
//!
//! Orchestrates a full compression run.
//!
//! ## Pipeline Stages
//! 1. **Scan** - Discover JPEG/PNG files under the input directory
//! 2. **Compress** - Re-encode each file on a bounded worker pool
//! 3. **Manifest** - List the produced files for the viewer
//!
//! ## Parallelism
//! Uses a dedicated rayon pool sized from the options. Files are independent;
//! each task's outcome is collected without affecting its siblings.

mod executor;

pub use executor::{CompressPipeline, CompressReport};
