//! Directory walking implementation using walkdir.

use super::{filter, filter::ImageFilter, ImageFile, ScanResult};
use crate::error::ScanError;
use crate::events::{Event, EventSender, ScanEvent};
use std::fs;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Configuration for the directory scanner
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Maximum directory depth (None = unlimited)
    pub max_depth: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            include_hidden: true,
            max_depth: None,
        }
    }
}

/// Scanner implementation using the walkdir crate
pub struct WalkDirScanner {
    config: ScanConfig,
    filter: ImageFilter,
}

impl WalkDirScanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        let filter = ImageFilter::new().with_hidden(config.include_hidden);
        Self { config, filter }
    }

    /// Lazily enumerate images under `root`.
    ///
    /// Entries within each directory are visited in file-name order. The
    /// iterator can be recreated at any time to restart the walk.
    pub fn images<'a>(
        &'a self,
        root: &Path,
    ) -> Result<impl Iterator<Item = Result<ImageFile, ScanError>> + 'a, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        let mut walker = WalkDir::new(root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();

        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        let include_hidden = self.config.include_hidden;

        Ok(walker
            .into_iter()
            .filter_entry(move |entry| {
                include_hidden || entry.depth() == 0 || !filter::is_hidden(entry.path())
            })
            .filter_map(move |entry| self.image_from_entry(entry)))
    }

    /// Walk `root` to completion, reporting through `events`
    pub fn scan_with_events(
        &self,
        root: &Path,
        events: &EventSender,
    ) -> Result<ScanResult, ScanError> {
        events.send(Event::Scan(ScanEvent::Started {
            root: root.to_path_buf(),
        }));

        let mut images = Vec::new();
        let mut errors = Vec::new();

        for item in self.images(root)? {
            match item {
                Ok(image) => {
                    events.send(Event::Scan(ScanEvent::ImageFound {
                        path: image.path.clone(),
                    }));
                    images.push(image);
                }
                Err(error) => {
                    tracing::warn!(error = %error, "Skipping unreadable entry");
                    events.send(Event::Scan(ScanEvent::Error {
                        path: error_path(&error).to_path_buf(),
                        message: error.to_string(),
                    }));
                    errors.push(error);
                }
            }
        }

        events.send(Event::Scan(ScanEvent::Completed {
            total_images: images.len(),
        }));

        Ok(ScanResult { images, errors })
    }

    /// Walk `root` to completion without progress reporting
    pub fn scan(&self, root: &Path) -> Result<ScanResult, ScanError> {
        self.scan_with_events(root, &crate::events::null_sender())
    }

    fn image_from_entry(
        &self,
        entry: walkdir::Result<DirEntry>,
    ) -> Option<Result<ImageFile, ScanError>> {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();
                let error = if e.io_error().map(|e| e.kind())
                    == Some(std::io::ErrorKind::PermissionDenied)
                {
                    ScanError::PermissionDenied { path }
                } else {
                    ScanError::ReadDirectory {
                        path,
                        source: std::io::Error::other(e.to_string()),
                    }
                };
                return Some(Err(error));
            }
        };

        let path = entry.path();
        if !path.is_file() || !self.filter.should_include(path) {
            return None;
        }

        let image = fs::metadata(path)
            .map(|metadata| ImageFile {
                path: path.to_path_buf(),
                size: metadata.len(),
                modified: metadata
                    .modified()
                    .unwrap_or(std::time::SystemTime::UNIX_EPOCH),
                format: self.filter.get_format(path),
            })
            .map_err(|source| ScanError::ReadDirectory {
                path: path.to_path_buf(),
                source,
            });

        Some(image)
    }
}

fn error_path(error: &ScanError) -> &Path {
    match error {
        ScanError::DirectoryNotFound { path }
        | ScanError::PermissionDenied { path }
        | ScanError::ReadDirectory { path, .. } => path,
    }
}
