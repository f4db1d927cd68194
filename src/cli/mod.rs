//! # CLI Module
//!
//! Command-line interface for the archive media tools.
//!
//! ## Usage
//! ```bash
//! # Compress scans into scans/images_optimized
//! media-tools compress
//!
//! # Rewrite in place with a lower JPEG quality
//! media-tools compress --input scans/images --overwrite --quality 60
//!
//! # Fetch posters
//! media-tools covers "The Deer Hunter:1978" "Halloween:1978"
//! ```

use archive_media_tools::core::compressor::{
    CompressionOptions, DEFAULT_INPUT_DIR, DEFAULT_JPEG_QUALITY, DEFAULT_OUTPUT_DIR,
    DEFAULT_PNG_PALETTE,
};
use archive_media_tools::core::covers::{
    default_queries, parse_items, CoverFetcher, CoverFetcherConfig, ItunesClient, ItunesConfig,
};
use archive_media_tools::core::pipeline::{CompressPipeline, CompressReport};
use archive_media_tools::core::scanner::SUPPORTED_EXTENSIONS;
use archive_media_tools::error::{CoverError, MediaToolsError, ScanError};
use archive_media_tools::events::{
    CompressEvent, Event, EventChannel, FileProgress, ManifestEvent, PipelineEvent,
};
use archive_media_tools::init_tracing;
use clap::{Parser, Subcommand};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;

/// Archive Media Tools - shrink scans and fetch movie posters
#[derive(Parser, Debug)]
#[command(name = "media-tools")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Re-encode JPEG/PNG scans and write a manifest
    Compress {
        /// Directory to scan for images
        #[arg(short, long, default_value = DEFAULT_INPUT_DIR)]
        input: PathBuf,

        /// Directory for compressed copies (ignored with --overwrite)
        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output: PathBuf,

        /// Rewrite the input files in place
        #[arg(long)]
        overwrite: bool,

        /// JPEG quality, clamped to 1-95
        #[arg(short, long, default_value_t = DEFAULT_JPEG_QUALITY as i64, allow_negative_numbers = true)]
        quality: i64,

        /// PNG palette size (0 keeps PNGs lossless)
        #[arg(long, default_value_t = DEFAULT_PNG_PALETTE as i64, allow_negative_numbers = true)]
        png_palette: i64,

        /// Worker threads (0 = one per CPU, at most 32)
        #[arg(short = 'j', long, default_value_t = 0)]
        jobs: usize,
    },

    /// Download poster artwork for movies
    Covers {
        /// Movies as `Title` or `Title:Year`
        items: Vec<String>,

        /// Directory the posters are saved into
        #[arg(long, default_value = "covers")]
        covers_dir: PathBuf,

        /// Edge length of the requested artwork
        #[arg(long, default_value_t = 1000)]
        size: u32,

        /// Text appended to the title for the last search attempt
        #[arg(long, default_value = "Mel Brooks")]
        search_suffix: String,
    },
}

/// Run the CLI
pub fn run() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Compress {
            input,
            output,
            overwrite,
            quality,
            png_palette,
            jobs,
        } => {
            let options = CompressionOptions::builder()
                .input_dir(input)
                .output_dir(output)
                .overwrite(overwrite)
                .jpeg_quality(quality)
                .png_palette(png_palette)
                .workers(jobs)
                .build();
            run_compress(options)
        }
        Commands::Covers {
            items,
            covers_dir,
            size,
            search_suffix,
        } => {
            let config = CoverFetcherConfig {
                covers_dir,
                artwork_size: size,
                search_suffix: Some(search_suffix).filter(|s| !s.trim().is_empty()),
            };
            run_covers(items, config)
        }
    }
}

fn run_compress(options: CompressionOptions) -> ExitCode {
    let term = Term::stderr();
    term.write_line(&format!(
        "{} {}",
        style("Scan Compressor").bold().cyan(),
        style(format!(
            "q={} palette={} workers={}",
            options.jpeg_quality(),
            options
                .png_palette()
                .map_or_else(|| "off".to_string(), |p| p.to_string()),
            options.workers()
        ))
        .dim()
    ))
    .ok();

    let input_dir = options.input_dir().to_path_buf();
    let pipeline = CompressPipeline::new(options);

    let (sender, receiver) = EventChannel::new();

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    let progress = pb.clone();

    // Per-file lines are printed in completion order while the pool runs
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    progress.set_message(phase.to_string());
                }
                Event::Compress(CompressEvent::Started { total_files, .. }) => {
                    progress.set_length(total_files as u64);
                }
                Event::Compress(CompressEvent::FileCompleted(file)) => {
                    progress.set_position(file.completed as u64);
                    let line = file_line(&file);
                    progress.suspend(|| println!("{}", line));
                }
                Event::Compress(CompressEvent::FileFailed {
                    output,
                    input_bytes,
                    output_bytes,
                    ..
                }) => {
                    progress.inc(1);
                    let line = size_line(&output, input_bytes, output_bytes);
                    progress.suspend(|| println!("{}", line));
                }
                Event::Manifest(ManifestEvent::Written {
                    json_path,
                    js_path,
                    entries,
                }) => {
                    let line = format!(
                        "Wrote manifest: {} and {} ({} items)",
                        json_path.display(),
                        js_path.display(),
                        entries
                    );
                    progress.suspend(|| println!("{}", line));
                }
                Event::Compress(CompressEvent::Completed { .. }) => {
                    progress.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let result = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    pb.finish_and_clear();

    match result {
        Ok(report) => {
            print_compress_summary(&term, &report, &input_dir);
            ExitCode::SUCCESS
        }
        Err(MediaToolsError::Scan(ScanError::DirectoryNotFound { path })) => {
            eprintln!(
                "{} Input directory not found: {}",
                style("error:").red().bold(),
                path.display()
            );
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("{} {}", style("error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn file_line(file: &FileProgress) -> String {
    size_line(&file.output, file.input_bytes, file.output_bytes)
}

/// `OUT: -X KiB (Y%)`, or `OUT: processed` when either size is unknown.
///
/// Skipped and failed files get the same line from whatever sizes exist.
fn size_line(output: &Path, input_bytes: u64, output_bytes: u64) -> String {
    if input_bytes == 0 || output_bytes == 0 {
        return format!("{}: processed", output.display());
    }

    let saved = input_bytes as i64 - output_bytes as i64;
    format!(
        "{}: {} ({})",
        output.display(),
        format_kib_delta(saved),
        format_percent(saved, input_bytes)
    )
}

fn print_compress_summary(term: &Term, report: &CompressReport, input_dir: &Path) {
    if report.total_images() == 0 {
        let extensions: Vec<String> = SUPPORTED_EXTENSIONS
            .iter()
            .map(|ext| format!(".{}", ext))
            .collect();
        println!(
            "No images found in {} (extensions: [{}])",
            input_dir.display(),
            extensions.join(", ")
        );
        return;
    }

    let summary = &report.summary;
    if summary.total_input_bytes > 0 {
        let saved = summary.bytes_saved();
        println!(
            "Total saved: {:.1} KiB ({})",
            saved as f64 / 1024.0,
            format_percent(saved, summary.total_input_bytes)
        );
    }

    term.write_line(&format!(
        "  {} compressed, {} skipped, {} failed in {:.1}s",
        style(summary.compressed).cyan(),
        style(summary.skipped).dim(),
        if summary.failed > 0 {
            style(summary.failed).red()
        } else {
            style(summary.failed).dim()
        },
        summary.duration_ms as f64 / 1000.0
    ))
    .ok();
}

fn run_covers(items: Vec<String>, config: CoverFetcherConfig) -> ExitCode {
    let client = match ItunesClient::new(ItunesConfig::default()) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{} {}", style("error:").red().bold(), e);
            return ExitCode::from(2);
        }
    };

    let queries = if items.is_empty() {
        default_queries()
    } else {
        parse_items(&items)
    };

    let fetcher = CoverFetcher::new(client, config);
    let mut saved = 0usize;

    for query in &queries {
        match fetcher.fetch(query) {
            Ok(cover) => {
                saved += 1;
                println!("Saved: {}", cover.filename);
            }
            Err(
                CoverError::NoResults { .. }
                | CoverError::NoMatch { .. }
                | CoverError::MissingArtwork { .. },
            ) => {
                eprintln!("No artwork found for: {}", query);
            }
            Err(e) => {
                eprintln!("Error fetching {}: {}", query.title, e);
            }
        }
    }

    if saved > 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn format_kib_delta(saved: i64) -> String {
    let kib = saved.unsigned_abs() as f64 / 1024.0;
    if saved >= 0 {
        format!("-{:.1} KiB", kib)
    } else {
        format!("+{:.1} KiB", kib)
    }
}

fn format_percent(saved: i64, total: u64) -> String {
    if total == 0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", saved as f64 / total as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kib_delta_signs() {
        assert_eq!(format_kib_delta(2048), "-2.0 KiB");
        assert_eq!(format_kib_delta(-512), "+0.5 KiB");
    }

    #[test]
    fn percent_of_input() {
        assert_eq!(format_percent(25, 100), "25.0%");
        assert_eq!(format_percent(-10, 100), "-10.0%");
        assert_eq!(format_percent(5, 0), "0.0%");
    }

    #[test]
    fn file_line_variants() {
        let mut file = FileProgress {
            completed: 1,
            total: 1,
            source: PathBuf::from("in/a.jpg"),
            output: PathBuf::from("out/a.jpg"),
            input_bytes: 4096,
            output_bytes: 1024,
            skipped: false,
        };
        assert_eq!(file_line(&file), "out/a.jpg: -3.0 KiB (75.0%)");

        file.output_bytes = 0;
        assert_eq!(file_line(&file), "out/a.jpg: processed");
    }

    #[test]
    fn skipped_file_reports_its_delta() {
        let file = FileProgress {
            completed: 2,
            total: 2,
            source: PathBuf::from("in/b.png"),
            output: PathBuf::from("out/b.png"),
            input_bytes: 2048,
            output_bytes: 3072,
            skipped: true,
        };
        assert_eq!(file_line(&file), "out/b.png: +1.0 KiB (-50.0%)");
    }

    #[test]
    fn failed_file_uses_best_effort_sizes() {
        let output = Path::new("out/c.jpg");
        assert_eq!(size_line(output, 1024, 0), "out/c.jpg: processed");
        assert_eq!(size_line(output, 4096, 2048), "out/c.jpg: -2.0 KiB (50.0%)");
    }

    #[test]
    fn cli_parses_compress_defaults() {
        let cli = Cli::try_parse_from(["media-tools", "compress"]).unwrap();
        match cli.command {
            Commands::Compress {
                input,
                quality,
                png_palette,
                jobs,
                overwrite,
                ..
            } => {
                assert_eq!(input, PathBuf::from(DEFAULT_INPUT_DIR));
                assert_eq!(quality, 75);
                assert_eq!(png_palette, 256);
                assert_eq!(jobs, 0);
                assert!(!overwrite);
            }
            _ => panic!("expected compress"),
        }
    }

    #[test]
    fn cli_parses_cover_items() {
        let cli =
            Cli::try_parse_from(["media-tools", "covers", "Halloween:1978", "--size", "600"])
                .unwrap();
        match cli.command {
            Commands::Covers { items, size, .. } => {
                assert_eq!(items, vec!["Halloween:1978"]);
                assert_eq!(size, 600);
            }
            _ => panic!("expected covers"),
        }
    }
}
