//! Encoder settings embedded in every re-encoded file.
//!
//! An in-place rewrite has no separate output to compare mtimes against,
//! so the stamp is how a later run recognises a file it already produced
//! with the same settings and leaves it alone.
//!
//! - JPEG: an APP15 segment holding the stamp text
//! - PNG: a `tEXt` chunk under the `Software` keyword

use crate::core::scanner::ImageFormat;
use std::io::Cursor;

/// APPn segment number used for the JPEG stamp
pub const JPEG_STAMP_SEGMENT: u8 = 15;

/// `tEXt` keyword used for the PNG stamp
pub const PNG_STAMP_KEYWORD: &str = "Software";

const STAMP_PREFIX: &str = "archive-media-tools";

const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
const JPEG_SOS: u8 = 0xDA;
const JPEG_EOI: u8 = 0xD9;
const JPEG_APP0: u8 = 0xE0;

pub fn jpeg_stamp(quality: u8) -> String {
    format!("{STAMP_PREFIX} jpeg q={quality}")
}

pub fn png_stamp(palette: Option<u16>) -> String {
    match palette {
        Some(colors) => format!("{STAMP_PREFIX} png palette={colors}"),
        None => format!("{STAMP_PREFIX} png palette=off"),
    }
}

/// Whether `bytes` carry exactly `stamp` for the given format
pub fn has_stamp(bytes: &[u8], format: ImageFormat, stamp: &str) -> bool {
    match format {
        ImageFormat::Jpeg => jpeg_segment(bytes, JPEG_APP0 + JPEG_STAMP_SEGMENT)
            .is_some_and(|payload| payload == stamp.as_bytes()),
        ImageFormat::Png => png_text(bytes, PNG_STAMP_KEYWORD).is_some_and(|text| text == stamp),
        ImageFormat::Unknown => false,
    }
}

/// Payload of the first `marker` segment before the scan data
fn jpeg_segment(bytes: &[u8], marker: u8) -> Option<&[u8]> {
    if !bytes.starts_with(&JPEG_SOI) {
        return None;
    }

    let mut pos = JPEG_SOI.len();
    while pos + 4 <= bytes.len() {
        if bytes[pos] != 0xFF {
            return None;
        }
        let kind = bytes[pos + 1];
        if kind == 0xFF {
            // Fill byte
            pos += 1;
            continue;
        }
        if kind == JPEG_SOS || kind == JPEG_EOI {
            return None;
        }

        let length = u16::from_be_bytes([bytes[pos + 2], bytes[pos + 3]]) as usize;
        let end = pos + 2 + length;
        if length < 2 || end > bytes.len() {
            return None;
        }
        if kind == marker {
            return Some(&bytes[pos + 4..end]);
        }
        pos = end;
    }
    None
}

fn png_text(bytes: &[u8], keyword: &str) -> Option<String> {
    let reader = png::Decoder::new(Cursor::new(bytes)).read_info().ok()?;
    reader
        .info()
        .uncompressed_latin1_text
        .iter()
        .find(|chunk| chunk.keyword == keyword)
        .map(|chunk| chunk.text.clone())
}
