//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the compression pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Directory scanning events
    Scan(ScanEvent),
    /// Per-file compression events
    Compress(CompressEvent),
    /// Manifest writer events
    Manifest(ManifestEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events during the scanning phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Scanning has started
    Started { root: PathBuf },
    /// An image was found
    ImageFound { path: PathBuf },
    /// An entry could not be read but scanning continues
    Error { path: PathBuf, message: String },
    /// Scanning completed
    Completed { total_images: usize },
}

/// Events during the compression phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CompressEvent {
    /// Workers are about to start
    Started { total_files: usize, workers: usize },
    /// A file finished, either re-encoded or skipped as up to date
    FileCompleted(FileProgress),
    /// A file failed; the batch continues
    FileFailed {
        source: PathBuf,
        output: PathBuf,
        /// Best-effort sizes, 0 when unreadable
        input_bytes: u64,
        output_bytes: u64,
        message: String,
    },
    /// All files have been handled
    Completed { summary: CompressSummary },
}

/// Outcome of one successfully handled file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileProgress {
    /// Number of files handled so far (completion order)
    pub completed: usize,
    /// Total number of files in the batch
    pub total: usize,
    pub source: PathBuf,
    pub output: PathBuf,
    pub input_bytes: u64,
    pub output_bytes: u64,
    /// True when the existing output was up to date and left untouched
    pub skipped: bool,
}

/// Totals for a finished compression run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressSummary {
    pub compressed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub total_input_bytes: u64,
    pub total_output_bytes: u64,
    pub duration_ms: u64,
}

impl CompressSummary {
    /// Bytes saved across all successful files (negative if outputs grew)
    pub fn bytes_saved(&self) -> i64 {
        self.total_input_bytes as i64 - self.total_output_bytes as i64
    }
}

/// Events from the manifest writer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ManifestEvent {
    /// Both manifest files were written
    Written {
        json_path: PathBuf,
        js_path: PathBuf,
        entries: usize,
    },
    /// Writing failed; the run still succeeds
    Failed { message: String },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
}

/// Phases of the compression pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Scanning,
    Compressing,
    WritingManifest,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Scanning => write!(f, "Scanning"),
            PipelinePhase::Compressing => write!(f, "Compressing"),
            PipelinePhase::WritingManifest => write!(f, "Writing manifest"),
        }
    }
}
