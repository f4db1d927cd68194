//! JPEG re-encoding.

use super::stamp::{jpeg_stamp, JPEG_STAMP_SEGMENT};
use crate::error::CompressError;
use image::DynamicImage;
use jpeg_encoder::{ColorType, Encoder, SamplingFactor};
use std::io::Write;
use std::path::Path;

/// Encode `image` as a progressive, Huffman-optimised 4:2:0 JPEG.
///
/// Any alpha channel is dropped; the encoder only sees plain RGB. The
/// quality is recorded in an APP15 stamp.
pub fn encode_jpeg<W: Write>(
    image: DynamicImage,
    quality: u8,
    writer: W,
    path: &Path,
) -> Result<(), CompressError> {
    let rgb = image.into_rgb8();
    let (width, height) = rgb.dimensions();

    let too_large = || CompressError::TooLarge {
        path: path.to_path_buf(),
        width,
        height,
    };
    let w = u16::try_from(width).map_err(|_| too_large())?;
    let h = u16::try_from(height).map_err(|_| too_large())?;

    let encode_error = |e: jpeg_encoder::EncodingError| CompressError::Encode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let mut encoder = Encoder::new(writer, quality);
    encoder.set_progressive(true);
    encoder.set_optimized_huffman_tables(true);
    encoder.set_sampling_factor(SamplingFactor::R_4_2_0);
    encoder
        .add_app_segment(JPEG_STAMP_SEGMENT, jpeg_stamp(quality).as_bytes())
        .map_err(encode_error)?;

    encoder
        .encode(rgb.as_raw(), w, h, ColorType::Rgb)
        .map_err(encode_error)
}
