//! # Compressor Module
//!
//! Re-encodes one image at a time without changing its pixel dimensions.
//!
//! ## Per-file flow
//! 1. Resolve the output path (in place, or mirrored under the output dir)
//! 2. Skip when the output is already up to date (for in-place rewrites:
//!    when the file already carries the stamp of the current settings)
//! 3. Decode, bake in the EXIF orientation, re-encode by format
//! 4. Replace the output atomically
//!
//! A failure is returned as [`TaskOutcome::Failed`] carrying the error and
//! best-effort sizes; it never aborts the batch.

mod jpeg;
mod options;
mod orientation;
mod output;
mod png_writer;
mod quantize;
mod stamp;

pub use jpeg::encode_jpeg;
pub use options::{
    clamp_quality, resolve_workers, CompressionOptions, CompressionOptionsBuilder,
    DEFAULT_INPUT_DIR, DEFAULT_JPEG_QUALITY, DEFAULT_OUTPUT_DIR, DEFAULT_PNG_PALETTE,
    MAX_JPEG_QUALITY, MAX_WORKERS, MIN_JPEG_QUALITY,
};
pub use orientation::{apply_orientation, read_orientation};
pub use output::{resolve_output_path, up_to_date_size};
pub use png_writer::{encode_png, quantize_indexed, quantize_preserving_alpha};
pub use quantize::Palette;
pub use stamp::{has_stamp, jpeg_stamp, png_stamp};

use crate::core::scanner::{ImageFile, ImageFormat};
use crate::error::CompressError;
use image::ImageReader;
use serde::Serialize;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// What happened to a file that was handled successfully
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaskStatus {
    /// Re-encoded (or copied) into the output path
    Compressed,
    /// Output was already up to date and left untouched
    Skipped,
}

/// Result of one successfully handled image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageTaskResult {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Size of the source before processing
    pub input_bytes: u64,
    /// Size of the output after processing
    pub output_bytes: u64,
    pub status: TaskStatus,
}

impl ImageTaskResult {
    /// Bytes saved (negative if the output is larger)
    pub fn bytes_saved(&self) -> i64 {
        self.input_bytes as i64 - self.output_bytes as i64
    }
}

/// A failed image, with whatever sizes could still be read
#[derive(Debug)]
pub struct TaskFailure {
    pub source: PathBuf,
    pub output: PathBuf,
    /// 0 if the source could not be statted
    pub input_bytes: u64,
    /// 0 if no output exists
    pub output_bytes: u64,
    pub error: CompressError,
}

/// Outcome of processing one image
#[derive(Debug)]
pub enum TaskOutcome {
    Done(ImageTaskResult),
    Failed(TaskFailure),
}

impl TaskOutcome {
    pub fn source(&self) -> &Path {
        match self {
            TaskOutcome::Done(result) => &result.source,
            TaskOutcome::Failed(failure) => &failure.source,
        }
    }

    /// Output path of a successful task
    pub fn output(&self) -> Option<&Path> {
        match self {
            TaskOutcome::Done(result) => Some(&result.output),
            TaskOutcome::Failed(_) => None,
        }
    }
}

/// Re-encodes single images according to a set of options
pub struct Compressor<'a> {
    options: &'a CompressionOptions,
}

impl<'a> Compressor<'a> {
    pub fn new(options: &'a CompressionOptions) -> Self {
        Self { options }
    }

    /// Process one discovered image. Never panics, never returns early.
    pub fn process(&self, image: &ImageFile) -> TaskOutcome {
        let output = resolve_output_path(&image.path, image.format, self.options);

        match self.compress(&image.path, image.format, &output) {
            Ok(result) => TaskOutcome::Done(result),
            Err(error) => {
                warn!(path = %image.path.display(), error = %error, "Failed to process image");
                TaskOutcome::Failed(TaskFailure {
                    input_bytes: output::size_or_zero(&image.path),
                    output_bytes: output::size_or_zero(&output),
                    source: image.path.clone(),
                    output,
                    error,
                })
            }
        }
    }

    /// Process the image at `source`, detecting its format from the extension
    pub fn process_path(&self, source: &Path) -> TaskOutcome {
        let format = ImageFormat::from_path(source);
        let modified = fs::metadata(source)
            .and_then(|m| m.modified())
            .unwrap_or(std::time::SystemTime::UNIX_EPOCH);

        self.process(&ImageFile {
            path: source.to_path_buf(),
            size: output::size_or_zero(source),
            modified,
            format,
        })
    }

    fn compress(
        &self,
        source: &Path,
        format: ImageFormat,
        output: &Path,
    ) -> Result<ImageTaskResult, CompressError> {
        let read_error = |e: std::io::Error| CompressError::Read {
            path: source.to_path_buf(),
            source: e,
        };

        let metadata = fs::metadata(source).map_err(read_error)?;
        let input_bytes = metadata.len();
        let in_place = output == source;
        let skipped = |output_bytes| ImageTaskResult {
            source: source.to_path_buf(),
            output: output.to_path_buf(),
            input_bytes,
            output_bytes,
            status: TaskStatus::Skipped,
        };

        if !in_place {
            let source_modified = metadata.modified().map_err(read_error)?;
            if let Some(existing) = up_to_date_size(source_modified, output) {
                debug!(path = %output.display(), "Output up to date, skipping");
                return Ok(skipped(existing));
            }
        }

        match format {
            ImageFormat::Jpeg | ImageFormat::Png => {
                let bytes = fs::read(source).map_err(read_error)?;
                let quality = self.options.jpeg_quality();
                let palette = self.options.png_palette();

                if in_place && has_stamp(&bytes, format, &self.settings_stamp(format)) {
                    debug!(path = %output.display(), "Already encoded with these settings, skipping");
                    return Ok(skipped(input_bytes));
                }

                let decoded = decode_upright(&bytes, source)?;

                output::write_atomically(output, metadata.permissions(), |writer| {
                    if format == ImageFormat::Jpeg {
                        encode_jpeg(decoded, quality, writer, source)
                    } else {
                        encode_png(decoded, palette, writer, source)
                    }
                })?;
            }
            ImageFormat::Unknown => {
                if !in_place {
                    output::ensure_parent_dir(output)?;
                    fs::copy(source, output).map_err(|e| CompressError::Write {
                        path: output.to_path_buf(),
                        source: e,
                    })?;
                }
            }
        }

        Ok(ImageTaskResult {
            source: source.to_path_buf(),
            output: output.to_path_buf(),
            input_bytes,
            output_bytes: output::size_or_zero(output),
            status: TaskStatus::Compressed,
        })
    }

    fn settings_stamp(&self, format: ImageFormat) -> String {
        match format {
            ImageFormat::Png => png_stamp(self.options.png_palette()),
            _ => jpeg_stamp(self.options.jpeg_quality()),
        }
    }
}

/// Decode `bytes` and apply their EXIF orientation
fn decode_upright(bytes: &[u8], path: &Path) -> Result<image::DynamicImage, CompressError> {
    let decode_error = |source: image::ImageError| CompressError::Decode {
        path: path.to_path_buf(),
        source,
    };

    let image = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CompressError::Read {
            path: path.to_path_buf(),
            source: e,
        })?
        .decode()
        .map_err(decode_error)?;

    Ok(match read_orientation(bytes) {
        Some(orientation) => apply_orientation(image, orientation),
        None => image,
    })
}
