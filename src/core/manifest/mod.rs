//! # Manifest Module
//!
//! Lists the produced images for the scan viewer.
//!
//! Two files are written into the manifest directory:
//! - `manifest.json` - an indented JSON array of paths
//! - `manifest.js` - the same array assigned to `window.SCANS_MANIFEST`, for
//!   pages opened from `file://` that cannot fetch JSON
//!
//! Entries are relative to the manifest directory, use `/` separators, are
//! restricted to supported image extensions, and are sorted and unique.
//! Paths outside the manifest directory fall back to their file name.

use crate::core::scanner::ImageFormat;
use crate::error::ManifestError;
use serde::Serialize;
use serde_json::ser::Formatter;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// File name of the JSON manifest
pub const MANIFEST_JSON: &str = "manifest.json";
/// File name of the script manifest
pub const MANIFEST_JS: &str = "manifest.js";
/// Global the script manifest assigns
pub const MANIFEST_GLOBAL: &str = "window.SCANS_MANIFEST";

/// Paths of a written manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestFiles {
    pub json_path: PathBuf,
    pub js_path: PathBuf,
    pub entries: Vec<String>,
}

/// Build the sorted, de-duplicated entry list for `outputs`
pub fn manifest_entries<P: AsRef<Path>>(outputs: &[P], manifest_dir: &Path) -> Vec<String> {
    outputs
        .iter()
        .map(as_path)
        .filter(|path| ImageFormat::from_path(path).is_supported())
        .filter_map(|path| relative_entry(path, manifest_dir))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn as_path<P: AsRef<Path>>(path: &P) -> &Path {
    path.as_ref()
}

fn relative_entry(path: &Path, manifest_dir: &Path) -> Option<String> {
    match path.strip_prefix(manifest_dir) {
        Ok(relative) => {
            let parts: Vec<_> = relative
                .components()
                .filter_map(|c| match c {
                    Component::Normal(part) => Some(part.to_string_lossy()),
                    _ => None,
                })
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join("/"))
            }
        }
        Err(_) => path.file_name().map(|n| n.to_string_lossy().into_owned()),
    }
}

/// Write both manifest files into `manifest_dir`
pub fn write_manifest(
    manifest_dir: &Path,
    entries: Vec<String>,
) -> Result<ManifestFiles, ManifestError> {
    fs::create_dir_all(manifest_dir).map_err(|source| ManifestError::Write {
        path: manifest_dir.to_path_buf(),
        source,
    })?;

    let json_path = manifest_dir.join(MANIFEST_JSON);
    let js_path = manifest_dir.join(MANIFEST_JS);

    let json = serde_json::to_string_pretty(&entries)?;
    fs::write(&json_path, json).map_err(|source| ManifestError::Write {
        path: json_path.clone(),
        source,
    })?;

    let mut script = format!("{} = ", MANIFEST_GLOBAL).into_bytes();
    entries.serialize(&mut serde_json::Serializer::with_formatter(
        &mut script,
        SpacedFormatter,
    ))?;
    script.extend_from_slice(b";\n");
    fs::write(&js_path, script).map_err(|source| ManifestError::Write {
        path: js_path.clone(),
        source,
    })?;

    Ok(ManifestFiles {
        json_path,
        js_path,
        entries,
    })
}

/// Single-line JSON with a space after each `,` and `:`
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}
