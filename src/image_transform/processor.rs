//! Image processing implementation
//!
//! Handles the actual transformation: decode → orient → resize. Encoding is
//! left to [`ImageResponse`](super::response::ImageResponse) so the caller can
//! pick the output format after seeing the decoded pixels.

use fast_image_resize::{FilterType, Image, PixelType, ResizeAlg, Resizer};
use image::io::Reader as ImageReader;
use image::DynamicImage;
use std::io::Cursor;
use std::num::NonZeroU32;

use super::error::ImageError;
use super::orientation::correct_orientation;
use super::sniff::{image_type_for_bytes, ImageType};

/// Result of decoding and transforming an image
#[derive(Debug, Clone)]
pub struct TransformedImage {
    /// The transformed pixels
    pub image: DynamicImage,
    /// Type sniffed from the source bytes
    pub source_type: Option<ImageType>,
    /// Decoded dimensions before orientation and resizing (width, height)
    pub original_size: (u32, u32),
    /// Final dimensions (width, height)
    pub output_size: (u32, u32),
    /// Whether EXIF orientation was corrected
    pub oriented: bool,
    /// Whether a resize was performed
    pub resized: bool,
}

/// Decode `data`, correct its orientation, and resize it.
///
/// When only one of `width`/`height` is given the other is derived from the
/// oriented aspect ratio, truncating toward zero. When neither is given the
/// image is only decoded and oriented.
pub fn transform_image(
    data: &[u8],
    width: Option<u32>,
    height: Option<u32>,
) -> Result<TransformedImage, ImageError> {
    // 1. Decode the image
    let source_type = image_type_for_bytes(data);
    let img = decode_image(data, source_type)?;
    let original_size = (img.width(), img.height());

    // 2. Correct orientation; libheif already applies the container's own
    //    rotation, so HEIC input skips the EXIF pass
    let (img, oriented) = if source_type == Some(ImageType::Heic) {
        (img, false)
    } else {
        correct_orientation(img, data)
    };

    // 3. Resize
    let target = calculate_dimensions(img.width(), img.height(), width, height)?;
    let (img, resized) = match target {
        Some((w, h)) if (w, h) != (img.width(), img.height()) => {
            (resize_image(&img, w, h)?, true)
        }
        _ => (img, false),
    };

    tracing::debug!(
        source_type = source_type.map(|t| t.as_str()).unwrap_or("unknown"),
        original_width = original_size.0,
        original_height = original_size.1,
        output_width = img.width(),
        output_height = img.height(),
        oriented,
        resized,
        "Image transformed"
    );

    Ok(TransformedImage {
        output_size: (img.width(), img.height()),
        image: img,
        source_type,
        original_size,
        oriented,
        resized,
    })
}

/// Decode image data into a DynamicImage
fn decode_image(data: &[u8], source_type: Option<ImageType>) -> Result<DynamicImage, ImageError> {
    if source_type == Some(ImageType::Heic) {
        return decode_heic(data);
    }

    let img = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ImageError::decode_failed(e.to_string()))?
        .decode()
        .map_err(|e| match e {
            image::ImageError::Unsupported(_) => ImageError::unsupported_format(
                source_type.map(|t| t.as_str()).unwrap_or("unknown"),
            ),
            other => ImageError::decode_failed(other.to_string()),
        })?;

    if img.width() == 0 || img.height() == 0 {
        return Err(ImageError::decode_failed("image has no pixels"));
    }
    Ok(img)
}

#[cfg(feature = "heic")]
fn decode_heic(data: &[u8]) -> Result<DynamicImage, ImageError> {
    use libheif_rs::{ColorSpace, HeifContext, RgbChroma};

    let ctx = HeifContext::read_from_bytes(data)
        .map_err(|e| ImageError::decode_failed(format!("Failed to read HEIC: {}", e)))?;
    let handle = ctx
        .primary_image_handle()
        .map_err(|e| ImageError::decode_failed(format!("Failed to get HEIC handle: {}", e)))?;

    let has_alpha = handle.has_alpha_channel();
    let chroma = if has_alpha {
        RgbChroma::Rgba
    } else {
        RgbChroma::Rgb
    };
    let heif_img = handle
        .decode(ColorSpace::Rgb(chroma), None)
        .map_err(|e| ImageError::decode_failed(format!("Failed to decode HEIC: {}", e)))?;

    let width = heif_img.width();
    let height = heif_img.height();
    let plane = heif_img
        .planes()
        .interleaved
        .ok_or_else(|| ImageError::decode_failed("HEIC image has no interleaved plane"))?;

    // Rows may be padded past width * channels
    let channels = if has_alpha { 4 } else { 3 };
    let row_len = width as usize * channels;
    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in plane.data.chunks(plane.stride).take(height as usize) {
        let row = row
            .get(..row_len)
            .ok_or_else(|| ImageError::decode_failed("HEIC plane row is truncated"))?;
        pixels.extend_from_slice(row);
    }

    let img = if has_alpha {
        image::RgbaImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgba8)
    } else {
        image::RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8)
    };
    img.ok_or_else(|| ImageError::decode_failed("HEIC pixel buffer has the wrong size"))
}

#[cfg(not(feature = "heic"))]
fn decode_heic(_data: &[u8]) -> Result<DynamicImage, ImageError> {
    Err(ImageError::unsupported_format(ImageType::Heic.as_str()))
}

/// Largest output the resizer will allocate (width * height)
pub const MAX_OUTPUT_PIXELS: u64 = 100_000_000;

/// Calculate target dimensions, deriving a missing side from the aspect ratio
///
/// Returns `None` when no resize is requested.
fn calculate_dimensions(
    src_width: u32,
    src_height: u32,
    width: Option<u32>,
    height: Option<u32>,
) -> Result<Option<(u32, u32)>, ImageError> {
    let (target_width, target_height) = match (width, height) {
        (None, None) => return Ok(None),
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, derive_side(f64::from(src_height) / f64::from(src_width), w)),
        (None, Some(h)) => (derive_side(f64::from(src_width) / f64::from(src_height), h), h),
    };

    let pixels = u64::from(target_width) * u64::from(target_height);
    if target_width == 0 || target_height == 0 || pixels > MAX_OUTPUT_PIXELS {
        return Err(ImageError::InvalidDimensions {
            width: target_width,
            height: target_height,
        });
    }
    Ok(Some((target_width, target_height)))
}

/// Scale `side` by `ratio`, truncating toward zero; `u32::MAX` when out of range
fn derive_side(ratio: f64, side: u32) -> u32 {
    let derived = (ratio * f64::from(side)).trunc();
    if derived < f64::from(u32::MAX) {
        derived as u32
    } else {
        u32::MAX
    }
}

/// Resize image using fast-image-resize with a Catmull-Rom (bicubic) filter
///
/// Images with an alpha channel stay RGBA, everything else becomes RGB.
fn resize_image(img: &DynamicImage, target_w: u32, target_h: u32) -> Result<DynamicImage, ImageError> {
    let has_alpha = img.color().has_alpha();
    let (pixel_type, buffer) = if has_alpha {
        (PixelType::U8x4, img.to_rgba8().into_raw())
    } else {
        (PixelType::U8x3, img.to_rgb8().into_raw())
    };

    let src_width =
        NonZeroU32::new(img.width()).ok_or_else(|| ImageError::resize_failed("Source width is 0"))?;
    let src_height = NonZeroU32::new(img.height())
        .ok_or_else(|| ImageError::resize_failed("Source height is 0"))?;
    let dst_width =
        NonZeroU32::new(target_w).ok_or_else(|| ImageError::resize_failed("Target width is 0"))?;
    let dst_height =
        NonZeroU32::new(target_h).ok_or_else(|| ImageError::resize_failed("Target height is 0"))?;

    let src_image = Image::from_vec_u8(src_width, src_height, buffer, pixel_type)
        .map_err(|e| ImageError::resize_failed(format!("Failed to create source image: {:?}", e)))?;
    let mut dst_image = Image::new(dst_width, dst_height, pixel_type);

    let mut resizer = Resizer::new(ResizeAlg::Convolution(FilterType::CatmullRom));
    resizer
        .resize(&src_image.view(), &mut dst_image.view_mut())
        .map_err(|e| ImageError::resize_failed(format!("Resize operation failed: {:?}", e)))?;

    let result_buf = dst_image.into_vec();
    let resized = if has_alpha {
        image::RgbaImage::from_raw(target_w, target_h, result_buf).map(DynamicImage::ImageRgba8)
    } else {
        image::RgbImage::from_raw(target_w, target_h, result_buf).map(DynamicImage::ImageRgb8)
    };
    resized.ok_or_else(|| ImageError::resize_failed("Failed to create output image buffer"))
}
