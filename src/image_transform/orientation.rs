//! EXIF orientation correction
//!
//! Only the pure rotations are corrected (orientations 3, 6 and 8); mirrored
//! orientations and unreadable metadata leave the image untouched.

use std::io::Cursor;

use image::DynamicImage;

/// Read the EXIF orientation tag from an encoded image.
///
/// Returns `None` if the container has no EXIF block, the block cannot be
/// parsed, or the tag is missing.
pub fn read_orientation(bytes: &[u8]) -> Option<u32> {
    let mut cursor = Cursor::new(bytes);
    let exif = exif::Reader::new().read_from_container(&mut cursor).ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    field.value.get_uint(0)
}

/// Rotate `img` upright according to `orientation`.
///
/// Returns the image and whether a rotation was applied.
pub fn apply_orientation(img: DynamicImage, orientation: u32) -> (DynamicImage, bool) {
    match orientation {
        3 => (img.rotate180(), true),
        6 => (img.rotate90(), true),
        8 => (img.rotate270(), true),
        _ => (img, false),
    }
}

/// Read the orientation from `bytes` and correct `img` if needed
pub fn correct_orientation(img: DynamicImage, bytes: &[u8]) -> (DynamicImage, bool) {
    match read_orientation(bytes) {
        Some(orientation) => apply_orientation(img, orientation),
        None => (img, false),
    }
}
