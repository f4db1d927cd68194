//! # Error Module
//!
//! Error types for the image compressor and the cover fetcher.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, titles, what went wrong
//! - **Isolate failures** - a single bad file or query is a value, not an abort

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum MediaToolsError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Compression error: {0}")]
    Compress(#[from] CompressError),

    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("Cover fetch error: {0}")]
    Cover(#[from] CoverError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while discovering images
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Input directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while re-encoding a single image
#[derive(Error, Debug)]
pub enum CompressError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Image {path} is {width}x{height}, too large for the JPEG encoder")]
    TooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
    },

    #[error("Failed to encode {path}: {reason}")]
    Encode { path: PathBuf, reason: String },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CompressError {
    /// Path of the file the error refers to
    pub fn path(&self) -> &PathBuf {
        match self {
            CompressError::Read { path, .. }
            | CompressError::Decode { path, .. }
            | CompressError::TooLarge { path, .. }
            | CompressError::Encode { path, .. }
            | CompressError::Write { path, .. } => path,
        }
    }
}

/// Errors that occur while writing the manifest files
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to write manifest {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors that occur while fetching a single movie cover
#[derive(Error, Debug)]
pub enum CoverError {
    #[error("HTTP client unavailable: {0}")]
    ClientUnavailable(#[source] reqwest::Error),

    #[error("No search results for \"{title}\"")]
    NoResults { title: String },

    #[error("No matching result for \"{title}\"")]
    NoMatch { title: String },

    #[error("Best match for \"{title}\" has no artwork")]
    MissingArtwork { title: String },

    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Download from {url} interrupted: {source}")]
    Download {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write cover {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, MediaToolsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_error_includes_path() {
        let error = ScanError::DirectoryNotFound {
            path: PathBuf::from("scans/images"),
        };
        assert!(error.to_string().contains("scans/images"));
    }

    #[test]
    fn compress_error_exposes_path() {
        let error = CompressError::Encode {
            path: PathBuf::from("/scans/page-01.png"),
            reason: "palette too large".to_string(),
        };
        assert_eq!(error.path(), &PathBuf::from("/scans/page-01.png"));
        let message = error.to_string();
        assert!(message.contains("/scans/page-01.png"));
        assert!(message.contains("palette too large"));
    }

    #[test]
    fn cover_error_names_title() {
        let error = CoverError::NoMatch {
            title: "Raging Bull".to_string(),
        };
        assert!(error.to_string().contains("Raging Bull"));
    }

    #[test]
    fn stage_errors_convert_to_top_level() {
        let error: MediaToolsError = ScanError::DirectoryNotFound {
            path: PathBuf::from("missing"),
        }
        .into();
        assert!(matches!(error, MediaToolsError::Scan(_)));
    }
}
