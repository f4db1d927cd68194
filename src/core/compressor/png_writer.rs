//! PNG re-encoding with optional palette quantization.
//!
//! - No quantization: the decoded pixels are re-encoded as-is.
//! - Opaque image: RGB is quantized and written as an indexed PNG.
//! - Image with alpha: only RGB is quantized; the original alpha channel is
//!   reattached untouched and the result is written as RGBA.
//!
//! Every path uses maximum compression with adaptive filtering and records
//! the palette setting in a `tEXt` stamp.

use super::quantize::Palette;
use super::stamp::{png_stamp, PNG_STAMP_KEYWORD};
use crate::error::CompressError;
use image::{DynamicImage, Rgba, RgbaImage};
use png::{BitDepth, ColorType};
use std::io::Write;
use std::path::Path;

/// Raw samples ready for the PNG encoder
struct PngPixels {
    width: u32,
    height: u32,
    color: ColorType,
    depth: BitDepth,
    palette: Option<Vec<u8>>,
    data: Vec<u8>,
}

/// Encode `image` as PNG, quantizing to `palette` colours when given
pub fn encode_png<W: Write>(
    image: DynamicImage,
    palette: Option<u16>,
    writer: W,
    path: &Path,
) -> Result<(), CompressError> {
    let pixels = match palette {
        None => lossless_pixels(image),
        Some(colors) if image.color().has_alpha() => {
            let quantized = quantize_preserving_alpha(&image, colors as usize);
            PngPixels {
                width: quantized.width(),
                height: quantized.height(),
                color: ColorType::Rgba,
                depth: BitDepth::Eight,
                palette: None,
                data: quantized.into_raw(),
            }
        }
        Some(colors) => {
            let (plte, indices) = quantize_indexed(&image, colors as usize);
            PngPixels {
                width: image.width(),
                height: image.height(),
                color: ColorType::Indexed,
                depth: BitDepth::Eight,
                palette: Some(plte.to_plte()),
                data: indices,
            }
        }
    };

    write_png(pixels, &png_stamp(palette), writer, path)
}

/// Quantize the colour channels of `image`, keeping its alpha bit-for-bit
pub fn quantize_preserving_alpha(image: &DynamicImage, colors: usize) -> RgbaImage {
    let mut rgba = image.to_rgba8();
    let palette = Palette::build(rgba.pixels().map(|p| [p[0], p[1], p[2]]), colors);

    for pixel in rgba.pixels_mut() {
        let [r, g, b] = palette.map([pixel[0], pixel[1], pixel[2]]);
        *pixel = Rgba([r, g, b, pixel[3]]);
    }
    rgba
}

/// Quantize an opaque image into a palette plus one index per pixel
pub fn quantize_indexed(image: &DynamicImage, colors: usize) -> (Palette, Vec<u8>) {
    let rgb = image.to_rgb8();
    let palette = Palette::build(rgb.pixels().map(|p| p.0), colors);

    let indices = rgb.pixels().map(|p| palette.index_of(p.0)).collect();
    (palette, indices)
}

/// Keep the decoded sample layout; anything PNG cannot hold becomes 8-bit
fn lossless_pixels(image: DynamicImage) -> PngPixels {
    let (width, height) = (image.width(), image.height());
    let (color, depth, data) = match image {
        DynamicImage::ImageLuma8(buf) => (ColorType::Grayscale, BitDepth::Eight, buf.into_raw()),
        DynamicImage::ImageLumaA8(buf) => {
            (ColorType::GrayscaleAlpha, BitDepth::Eight, buf.into_raw())
        }
        DynamicImage::ImageRgb8(buf) => (ColorType::Rgb, BitDepth::Eight, buf.into_raw()),
        DynamicImage::ImageRgba8(buf) => (ColorType::Rgba, BitDepth::Eight, buf.into_raw()),
        DynamicImage::ImageLuma16(buf) => {
            (ColorType::Grayscale, BitDepth::Sixteen, big_endian(buf.as_raw()))
        }
        DynamicImage::ImageLumaA16(buf) => {
            (ColorType::GrayscaleAlpha, BitDepth::Sixteen, big_endian(buf.as_raw()))
        }
        DynamicImage::ImageRgb16(buf) => (ColorType::Rgb, BitDepth::Sixteen, big_endian(buf.as_raw())),
        DynamicImage::ImageRgba16(buf) => {
            (ColorType::Rgba, BitDepth::Sixteen, big_endian(buf.as_raw()))
        }
        other if other.color().has_alpha() => {
            (ColorType::Rgba, BitDepth::Eight, other.into_rgba8().into_raw())
        }
        other => (ColorType::Rgb, BitDepth::Eight, other.into_rgb8().into_raw()),
    };

    PngPixels {
        width,
        height,
        color,
        depth,
        palette: None,
        data,
    }
}

fn big_endian(samples: &[u16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_be_bytes()).collect()
}

fn write_png<W: Write>(
    pixels: PngPixels,
    stamp: &str,
    writer: W,
    path: &Path,
) -> Result<(), CompressError> {
    let encode_error = |e: png::EncodingError| CompressError::Encode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let mut encoder = png::Encoder::new(writer, pixels.width, pixels.height);
    encoder.set_color(pixels.color);
    encoder.set_depth(pixels.depth);
    if let Some(plte) = pixels.palette {
        encoder.set_palette(plte);
    }
    encoder.set_compression(png::Compression::Best);
    encoder.set_adaptive_filter(png::AdaptiveFilterType::Adaptive);
    encoder
        .add_text_chunk(PNG_STAMP_KEYWORD.to_string(), stamp.to_string())
        .map_err(encode_error)?;

    let mut png_writer = encoder.write_header().map_err(encode_error)?;
    png_writer.write_image_data(&pixels.data).map_err(encode_error)?;
    png_writer.finish().map_err(encode_error)
}
