//! Compression options and their builder.

use std::path::{Path, PathBuf};

/// Default input directory
pub const DEFAULT_INPUT_DIR: &str = "scans/images";
/// Default mirrored output directory
pub const DEFAULT_OUTPUT_DIR: &str = "scans/images_optimized";
/// Default JPEG quality
pub const DEFAULT_JPEG_QUALITY: u8 = 75;
/// Lowest accepted JPEG quality
pub const MIN_JPEG_QUALITY: u8 = 1;
/// Highest accepted JPEG quality
pub const MAX_JPEG_QUALITY: u8 = 95;
/// Default PNG palette size
pub const DEFAULT_PNG_PALETTE: u16 = 256;
/// Largest palette an indexed PNG can carry
pub const MAX_PNG_PALETTE: u16 = 256;
/// Upper bound on worker threads
pub const MAX_WORKERS: usize = 32;
/// Worker count when the CPU count cannot be determined
pub const FALLBACK_WORKERS: usize = 4;

/// Validated, immutable settings for one compression run.
///
/// Built with [`CompressionOptions::builder`]; every value is resolved at
/// build time, including the worker count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionOptions {
    input_dir: PathBuf,
    output_dir: PathBuf,
    overwrite: bool,
    jpeg_quality: u8,
    png_palette: Option<u16>,
    workers: usize,
}

impl CompressionOptions {
    /// Create a new options builder
    pub fn builder() -> CompressionOptionsBuilder {
        CompressionOptionsBuilder::new()
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    /// Mirrored output root; unused when overwriting in place
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    /// JPEG quality, always within 1..=95
    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    /// Palette size for PNG quantization, `None` when disabled
    pub fn png_palette(&self) -> Option<u16> {
        self.png_palette
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Directory the manifest files are written to
    pub fn manifest_dir(&self) -> &Path {
        if self.overwrite {
            &self.input_dir
        } else {
            &self.output_dir
        }
    }
}

impl Default for CompressionOptions {
    fn default() -> Self {
        CompressionOptionsBuilder::new().build()
    }
}

/// Builder for [`CompressionOptions`].
///
/// Accepts raw user values; `build` clamps and resolves them.
#[derive(Debug, Clone)]
pub struct CompressionOptionsBuilder {
    input_dir: PathBuf,
    output_dir: PathBuf,
    overwrite: bool,
    jpeg_quality: i64,
    png_palette: i64,
    workers: usize,
}

impl CompressionOptionsBuilder {
    /// Create a builder holding the CLI defaults
    pub fn new() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            overwrite: false,
            jpeg_quality: DEFAULT_JPEG_QUALITY as i64,
            png_palette: DEFAULT_PNG_PALETTE as i64,
            workers: 0,
        }
    }

    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.input_dir = dir.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Re-encode files in place instead of mirroring them
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Requested JPEG quality; clamped to 1..=95 on build
    pub fn jpeg_quality(mut self, quality: i64) -> Self {
        self.jpeg_quality = quality;
        self
    }

    /// Requested palette size; `<= 0` disables quantization
    pub fn png_palette(mut self, colors: i64) -> Self {
        self.png_palette = colors;
        self
    }

    /// Requested worker count; 0 means one per CPU
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Resolve every setting into immutable options
    pub fn build(self) -> CompressionOptions {
        CompressionOptions {
            input_dir: self.input_dir,
            output_dir: self.output_dir,
            overwrite: self.overwrite,
            jpeg_quality: clamp_quality(self.jpeg_quality),
            png_palette: resolve_palette(self.png_palette),
            workers: resolve_workers(self.workers),
        }
    }
}

impl Default for CompressionOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Clamp a requested JPEG quality into the accepted range
pub fn clamp_quality(requested: i64) -> u8 {
    requested.clamp(MIN_JPEG_QUALITY as i64, MAX_JPEG_QUALITY as i64) as u8
}

fn resolve_palette(requested: i64) -> Option<u16> {
    if requested <= 0 {
        None
    } else {
        Some(requested.min(MAX_PNG_PALETTE as i64) as u16)
    }
}

/// Resolve a requested worker count, reading the CPU count only when 0
pub fn resolve_workers(requested: usize) -> usize {
    let workers = if requested > 0 {
        requested
    } else {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(FALLBACK_WORKERS)
    };
    workers.min(MAX_WORKERS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cli_defaults() {
        let options = CompressionOptions::builder().workers(3).build();

        assert_eq!(options.input_dir(), Path::new("scans/images"));
        assert_eq!(options.output_dir(), Path::new("scans/images_optimized"));
        assert!(!options.overwrite());
        assert_eq!(options.jpeg_quality(), 75);
        assert_eq!(options.png_palette(), Some(256));
        assert_eq!(options.workers(), 3);
    }

    #[test]
    fn quality_is_clamped() {
        assert_eq!(CompressionOptions::builder().jpeg_quality(0).build().jpeg_quality(), 1);
        assert_eq!(CompressionOptions::builder().jpeg_quality(200).build().jpeg_quality(), 95);
        assert_eq!(CompressionOptions::builder().jpeg_quality(-7).build().jpeg_quality(), 1);
        assert_eq!(CompressionOptions::builder().jpeg_quality(60).build().jpeg_quality(), 60);
    }

    #[test]
    fn non_positive_palette_disables_quantization() {
        assert_eq!(CompressionOptions::builder().png_palette(0).build().png_palette(), None);
        assert_eq!(CompressionOptions::builder().png_palette(-1).build().png_palette(), None);
        assert_eq!(CompressionOptions::builder().png_palette(64).build().png_palette(), Some(64));
    }

    #[test]
    fn oversized_palette_is_capped() {
        let options = CompressionOptions::builder().png_palette(4096).build();
        assert_eq!(options.png_palette(), Some(256));
    }

    #[test]
    fn auto_workers_are_bounded() {
        let workers = resolve_workers(0);
        assert!(workers >= 1);
        assert!(workers <= MAX_WORKERS);
        assert_eq!(resolve_workers(500), MAX_WORKERS);
        assert_eq!(resolve_workers(2), 2);
    }

    #[test]
    fn manifest_dir_follows_mode() {
        let mirrored = CompressionOptions::builder()
            .input_dir("in")
            .output_dir("out")
            .build();
        assert_eq!(mirrored.manifest_dir(), Path::new("out"));

        let in_place = CompressionOptions::builder()
            .input_dir("in")
            .output_dir("out")
            .overwrite(true)
            .build();
        assert_eq!(in_place.manifest_dir(), Path::new("in"));
    }
}
