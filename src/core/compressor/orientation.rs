//! EXIF orientation handling.
//!
//! Re-encoded files carry no EXIF block, so the stored orientation is baked
//! into the pixel buffer before encoding.

use exif::{In, Reader, Tag};
use image::DynamicImage;
use std::io::Cursor;

/// Read the EXIF orientation (1-8) from an encoded image, if present
pub fn read_orientation(bytes: &[u8]) -> Option<u32> {
    let mut cursor = Cursor::new(bytes);
    let exif = Reader::new().read_from_container(&mut cursor).ok()?;
    let field = exif.get_field(Tag::Orientation, In::PRIMARY)?;
    field.value.get_uint(0)
}

/// Transpose `image` so that it displays upright without EXIF.
///
/// Values outside 1-8 are treated as "already upright".
pub fn apply_orientation(image: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        // Transpose
        5 => image.rotate90().fliph(),
        6 => image.rotate90(),
        // Transverse
        7 => image.rotate270().fliph(),
        8 => image.rotate270(),
        _ => image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn marked_image() -> DynamicImage {
        // 3x2, red marker in the top-left corner
        let mut img = RgbImage::from_pixel(3, 2, Rgb([0, 0, 0]));
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        DynamicImage::ImageRgb8(img)
    }

    fn red_at(image: &DynamicImage) -> (u32, u32) {
        let rgb = image.to_rgb8();
        let (x, y, _) = rgb
            .enumerate_pixels()
            .find(|(_, _, p)| p.0 == [255, 0, 0])
            .unwrap();
        (x, y)
    }

    #[test]
    fn upright_orientation_is_untouched() {
        let out = apply_orientation(marked_image(), 1);
        assert_eq!((out.width(), out.height()), (3, 2));
        assert_eq!(red_at(&out), (0, 0));
    }

    #[test]
    fn rotated_orientations_swap_dimensions() {
        for orientation in 5..=8 {
            let out = apply_orientation(marked_image(), orientation);
            assert_eq!((out.width(), out.height()), (2, 3), "orientation {}", orientation);
        }
    }

    #[test]
    fn orientation_six_rotates_clockwise() {
        let out = apply_orientation(marked_image(), 6);
        // Top-left moves to top-right after a clockwise quarter turn
        assert_eq!(red_at(&out), (1, 0));
    }

    #[test]
    fn transpose_keeps_top_left() {
        let out = apply_orientation(marked_image(), 5);
        assert_eq!(red_at(&out), (0, 0));
    }

    #[test]
    fn mirrored_orientation_flips() {
        assert_eq!(red_at(&apply_orientation(marked_image(), 2)), (2, 0));
        assert_eq!(red_at(&apply_orientation(marked_image(), 4)), (0, 1));
        assert_eq!(red_at(&apply_orientation(marked_image(), 3)), (2, 1));
    }

    /// SOI, then an APP1 Exif block holding only the Orientation tag, then EOI
    fn exif_only_jpeg(orientation: u8) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE1, 0x00, 0x22];
        bytes.extend_from_slice(b"Exif\0\0MM\0\x2A\0\0\0\x08");
        bytes.extend_from_slice(&[0x00, 0x01, 0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01]);
        bytes.extend_from_slice(&[0x00, orientation, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
        bytes.extend_from_slice(&[0xFF, 0xD9]);
        bytes
    }

    #[test]
    fn orientation_tag_is_read_from_app1() {
        assert_eq!(read_orientation(&exif_only_jpeg(6)), Some(6));
        assert_eq!(read_orientation(&exif_only_jpeg(3)), Some(3));
    }

    #[test]
    fn missing_exif_reads_as_none() {
        assert_eq!(read_orientation(b"not an image"), None);
    }
}
