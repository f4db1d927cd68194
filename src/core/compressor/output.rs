//! Output path resolution, the up-to-date check, and atomic writes.

use super::CompressionOptions;
use crate::core::scanner::ImageFormat;
use crate::error::CompressError;
use std::fs::{self, File, Permissions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Where the re-encoded version of `source` is written.
///
/// In place when overwriting; otherwise mirrored under the output directory,
/// with JPEGs normalised to a `.jpg` extension.
pub fn resolve_output_path(
    source: &Path,
    format: ImageFormat,
    options: &CompressionOptions,
) -> PathBuf {
    if options.overwrite() {
        return source.to_path_buf();
    }

    let relative = source
        .strip_prefix(options.input_dir())
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| source.file_name().map(PathBuf::from).unwrap_or_default());

    let mut output = options.output_dir().join(relative);
    if format == ImageFormat::Jpeg {
        output.set_extension("jpg");
    }
    output
}

/// Size of `output` if it already holds an up-to-date result.
///
/// Up to date means: it exists, is non-empty, and was modified no earlier
/// than the source. Relies on comparable clocks for both files.
pub fn up_to_date_size(source_modified: SystemTime, output: &Path) -> Option<u64> {
    let metadata = fs::metadata(output).ok()?;
    let modified = metadata.modified().ok()?;

    if modified >= source_modified && metadata.len() > 0 {
        Some(metadata.len())
    } else {
        None
    }
}

/// Size of a file, or 0 when it cannot be statted
pub fn size_or_zero(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

/// Create the parent directory of `path`. Safe to race with other workers.
pub fn ensure_parent_dir(path: &Path) -> Result<(), CompressError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|source| CompressError::Write {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

/// Write `dest` through a sibling temp file that replaces it only on success.
///
/// The temp file gets `permissions` so an in-place rewrite keeps the
/// original file mode.
pub fn write_atomically<F>(
    dest: &Path,
    permissions: Permissions,
    encode: F,
) -> Result<(), CompressError>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> Result<(), CompressError>,
{
    ensure_parent_dir(dest)?;
    let parent = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let write_error = |source: std::io::Error| CompressError::Write {
        path: dest.to_path_buf(),
        source,
    };

    let mut temp = tempfile::Builder::new()
        .prefix(".")
        .suffix(".part")
        .permissions(permissions)
        .tempfile_in(parent)
        .map_err(write_error)?;

    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        encode(&mut writer)?;
        writer.flush().map_err(write_error)?;
    }

    temp.persist(dest).map_err(|e| write_error(e.error))?;
    Ok(())
}
