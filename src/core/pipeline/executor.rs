//! Pipeline execution implementation.

use crate::core::compressor::{CompressionOptions, Compressor, TaskOutcome, TaskStatus};
use crate::core::manifest::{manifest_entries, write_manifest, ManifestFiles};
use crate::core::scanner::{ScanConfig, WalkDirScanner};
use crate::error::{CompressError, MediaToolsError};
use crate::events::{
    null_sender, CompressEvent, CompressSummary, Event, EventSender, FileProgress, ManifestEvent,
    PipelineEvent, PipelinePhase,
};
use rayon::prelude::*;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{info, warn};

/// Result of a compression run
#[derive(Debug)]
pub struct CompressReport {
    /// One outcome per discovered image, in scan order
    pub outcomes: Vec<TaskOutcome>,
    /// Totals over successful files
    pub summary: CompressSummary,
    /// Written manifest, `None` if nothing was found or writing failed
    pub manifest: Option<ManifestFiles>,
}

impl CompressReport {
    /// Number of images the scan discovered
    pub fn total_images(&self) -> usize {
        self.outcomes.len()
    }
}

/// Scan, compress in parallel, then write the manifest
pub struct CompressPipeline {
    options: CompressionOptions,
    scan_config: ScanConfig,
}

impl CompressPipeline {
    /// Create a pipeline with the default scanner configuration
    pub fn new(options: CompressionOptions) -> Self {
        Self {
            options,
            scan_config: ScanConfig::default(),
        }
    }

    /// Override the scanner configuration
    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.scan_config = config;
        self
    }

    pub fn options(&self) -> &CompressionOptions {
        &self.options
    }

    /// Run without progress reporting
    pub fn run(&self) -> Result<CompressReport, MediaToolsError> {
        self.run_with_events(&null_sender())
    }

    /// Run with progress reporting.
    ///
    /// Only a missing input directory (or an unusable output directory) is
    /// fatal; per-file and manifest failures are reported and absorbed.
    pub fn run_with_events(&self, events: &EventSender) -> Result<CompressReport, MediaToolsError> {
        let start_time = Instant::now();

        // Phase 1: Scanning
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Scanning,
        }));

        let scanner = WalkDirScanner::new(self.scan_config.clone());
        let scan_result = scanner.scan_with_events(self.options.input_dir(), events)?;

        if !self.options.overwrite() {
            let output_dir = self.options.output_dir();
            fs::create_dir_all(output_dir).map_err(|source| CompressError::Write {
                path: output_dir.to_path_buf(),
                source,
            })?;
        }

        let images = scan_result.images;
        if images.is_empty() {
            return Ok(CompressReport {
                outcomes: Vec::new(),
                summary: CompressSummary {
                    duration_ms: start_time.elapsed().as_millis() as u64,
                    ..Default::default()
                },
                manifest: None,
            });
        }

        // Phase 2: Compressing
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Compressing,
        }));

        let workers = self.options.workers();
        events.send(Event::Compress(CompressEvent::Started {
            total_files: images.len(),
            workers,
        }));
        info!(images = images.len(), workers, "Compressing images");

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("compress-{}", i))
            .build()
            .map_err(|e| MediaToolsError::Config(format!("Failed to start worker pool: {}", e)))?;

        let compressor = Compressor::new(&self.options);
        let completed = AtomicUsize::new(0);
        let total = images.len();

        let outcomes: Vec<TaskOutcome> = pool.install(|| {
            images
                .par_iter()
                .map(|image| {
                    let outcome = compressor.process(image);
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    events.send(Event::Compress(progress_event(&outcome, done, total)));
                    outcome
                })
                .collect()
        });

        let mut summary = summarize(&outcomes);

        // Phase 3: Manifest
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::WritingManifest,
        }));

        let manifest_dir = self.options.manifest_dir();
        let outputs: Vec<_> = outcomes.iter().filter_map(TaskOutcome::output).collect();
        let entries = manifest_entries(&outputs, manifest_dir);

        let manifest = match write_manifest(manifest_dir, entries) {
            Ok(files) => {
                events.send(Event::Manifest(ManifestEvent::Written {
                    json_path: files.json_path.clone(),
                    js_path: files.js_path.clone(),
                    entries: files.entries.len(),
                }));
                Some(files)
            }
            Err(error) => {
                warn!(error = %error, "Failed to write manifest");
                events.send(Event::Manifest(ManifestEvent::Failed {
                    message: error.to_string(),
                }));
                None
            }
        };

        summary.duration_ms = start_time.elapsed().as_millis() as u64;
        events.send(Event::Compress(CompressEvent::Completed {
            summary: summary.clone(),
        }));

        Ok(CompressReport {
            outcomes,
            summary,
            manifest,
        })
    }
}

fn progress_event(outcome: &TaskOutcome, completed: usize, total: usize) -> CompressEvent {
    match outcome {
        TaskOutcome::Done(result) => CompressEvent::FileCompleted(FileProgress {
            completed,
            total,
            source: result.source.clone(),
            output: result.output.clone(),
            input_bytes: result.input_bytes,
            output_bytes: result.output_bytes,
            skipped: result.status == TaskStatus::Skipped,
        }),
        TaskOutcome::Failed(failure) => CompressEvent::FileFailed {
            source: failure.source.clone(),
            output: failure.output.clone(),
            input_bytes: failure.input_bytes,
            output_bytes: failure.output_bytes,
            message: failure.error.to_string(),
        },
    }
}

fn summarize(outcomes: &[TaskOutcome]) -> CompressSummary {
    let mut summary = CompressSummary::default();

    for outcome in outcomes {
        match outcome {
            TaskOutcome::Done(result) => {
                match result.status {
                    TaskStatus::Compressed => summary.compressed += 1,
                    TaskStatus::Skipped => summary.skipped += 1,
                }
                summary.total_input_bytes += result.input_bytes;
                summary.total_output_bytes += result.output_bytes;
            }
            TaskOutcome::Failed(_) => summary.failed += 1,
        }
    }

    summary
}
