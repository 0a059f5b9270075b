//! Image encoder abstraction
//!
//! One encoder per output format behind a common trait, so the response layer
//! only has to pick a format.

use std::io::Cursor;

use image::{ColorType, DynamicImage, ImageEncoder as _};

use super::config::DEFAULT_QUALITY;
use super::error::ImageError;
use super::params::OutputFormat;

/// Quality settings for lossy encoders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderQuality {
    /// Quality value (1-100, where 100 is best quality)
    pub quality: u8,
}

impl Default for EncoderQuality {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
        }
    }
}

impl EncoderQuality {
    /// Create quality settings with specified quality level
    pub fn with_quality(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }
}

/// Result of encoding an image
#[derive(Debug)]
pub struct EncodedImage {
    /// The encoded image data
    pub data: Vec<u8>,
    /// The output format
    pub format: OutputFormat,
    /// Content-Type header value
    pub content_type: &'static str,
}

impl EncodedImage {
    pub fn new(data: Vec<u8>, format: OutputFormat) -> Self {
        Self {
            data,
            format,
            content_type: format.content_type(),
        }
    }
}

/// Trait for image encoders
pub trait ImageEncoder: Send + Sync {
    /// The output format this encoder produces
    fn format(&self) -> OutputFormat;

    /// Encode decoded pixels to the target format
    fn encode(&self, img: &DynamicImage, quality: EncoderQuality)
        -> Result<EncodedImage, ImageError>;

    /// Check if this encoder keeps the alpha channel
    fn supports_transparency(&self) -> bool;
}

/// JPEG encoder using the image crate
pub struct JpegEncoder;

impl ImageEncoder for JpegEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Jpeg
    }

    fn encode(
        &self,
        img: &DynamicImage,
        quality: EncoderQuality,
    ) -> Result<EncodedImage, ImageError> {
        use image::codecs::jpeg::JpegEncoder as ImageJpegEncoder;

        // JPEG has no alpha channel
        let rgb = img.to_rgb8();

        let mut output = Cursor::new(Vec::new());
        ImageJpegEncoder::new_with_quality(&mut output, quality.quality)
            .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
            .map_err(|e| ImageError::encode_failed("jpeg", e.to_string()))?;

        Ok(EncodedImage::new(output.into_inner(), OutputFormat::Jpeg))
    }

    fn supports_transparency(&self) -> bool {
        false
    }
}

/// PNG encoder using the image crate
pub struct PngEncoder;

impl ImageEncoder for PngEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Png
    }

    fn encode(
        &self,
        img: &DynamicImage,
        _quality: EncoderQuality,
    ) -> Result<EncodedImage, ImageError> {
        use image::codecs::png::PngEncoder as ImagePngEncoder;

        let (data, color) = flatten_to_8bit(img);
        let mut output = Cursor::new(Vec::new());
        ImagePngEncoder::new(&mut output)
            .write_image(&data, img.width(), img.height(), color)
            .map_err(|e| ImageError::encode_failed("png", e.to_string()))?;

        Ok(EncodedImage::new(output.into_inner(), OutputFormat::Png))
    }

    fn supports_transparency(&self) -> bool {
        true
    }
}

/// GIF encoder using the image crate (palette is quantized from RGBA)
pub struct GifEncoder;

impl ImageEncoder for GifEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Gif
    }

    fn encode(
        &self,
        img: &DynamicImage,
        _quality: EncoderQuality,
    ) -> Result<EncodedImage, ImageError> {
        use image::codecs::gif::GifEncoder as ImageGifEncoder;

        let rgba = img.to_rgba8();
        let mut output = Cursor::new(Vec::new());
        {
            let mut encoder = ImageGifEncoder::new(&mut output);
            encoder
                .encode(rgba.as_raw(), rgba.width(), rgba.height(), ColorType::Rgba8)
                .map_err(|e| ImageError::encode_failed("gif", e.to_string()))?;
        }

        Ok(EncodedImage::new(output.into_inner(), OutputFormat::Gif))
    }

    fn supports_transparency(&self) -> bool {
        true
    }
}

/// Lossy WebP encoder backed by libwebp
pub struct WebPEncoder;

impl ImageEncoder for WebPEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::WebP
    }

    fn encode(
        &self,
        img: &DynamicImage,
        quality: EncoderQuality,
    ) -> Result<EncodedImage, ImageError> {
        let quality = f32::from(quality.quality);
        let (pixels, color) = flatten_to_8bit(img);
        let encoder = if color == ColorType::Rgba8 {
            webp::Encoder::from_rgba(&pixels, img.width(), img.height())
        } else {
            webp::Encoder::from_rgb(&pixels, img.width(), img.height())
        };

        // libwebp rejects some inputs, e.g. sides above 16383 px
        let data = encoder
            .encode_simple(false, quality)
            .map_err(|e| ImageError::encode_failed("webp", format!("{:?}", e)))?
            .to_vec();
        Ok(EncodedImage::new(data, OutputFormat::WebP))
    }

    fn supports_transparency(&self) -> bool {
        true
    }
}

/// BMP encoder using the image crate
pub struct BmpEncoder;

impl ImageEncoder for BmpEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Bmp
    }

    fn encode(
        &self,
        img: &DynamicImage,
        _quality: EncoderQuality,
    ) -> Result<EncodedImage, ImageError> {
        use image::codecs::bmp::BmpEncoder as ImageBmpEncoder;

        let (data, color) = flatten_to_8bit(img);
        let mut output = Cursor::new(Vec::new());
        ImageBmpEncoder::new(&mut output)
            .write_image(&data, img.width(), img.height(), color)
            .map_err(|e| ImageError::encode_failed("bmp", e.to_string()))?;

        Ok(EncodedImage::new(output.into_inner(), OutputFormat::Bmp))
    }

    fn supports_transparency(&self) -> bool {
        true
    }
}

/// TIFF encoder using the image crate
pub struct TiffEncoder;

impl ImageEncoder for TiffEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Tiff
    }

    fn encode(
        &self,
        img: &DynamicImage,
        _quality: EncoderQuality,
    ) -> Result<EncodedImage, ImageError> {
        use image::codecs::tiff::TiffEncoder as ImageTiffEncoder;

        let (data, color) = flatten_to_8bit(img);
        let mut output = Cursor::new(Vec::new());
        ImageTiffEncoder::new(&mut output)
            .write_image(&data, img.width(), img.height(), color)
            .map_err(|e| ImageError::encode_failed("tiff", e.to_string()))?;

        Ok(EncodedImage::new(output.into_inner(), OutputFormat::Tiff))
    }

    fn supports_transparency(&self) -> bool {
        true
    }
}

/// Factory for creating encoders based on output format
pub struct EncoderFactory;

impl EncoderFactory {
    pub fn create(format: OutputFormat) -> Box<dyn ImageEncoder> {
        match format {
            OutputFormat::Jpeg => Box::new(JpegEncoder),
            OutputFormat::Png => Box::new(PngEncoder),
            OutputFormat::Gif => Box::new(GifEncoder),
            OutputFormat::WebP => Box::new(WebPEncoder),
            OutputFormat::Bmp => Box::new(BmpEncoder),
            OutputFormat::Tiff => Box::new(TiffEncoder),
        }
    }
}

/// 8-bit RGB or RGBA pixels, the layouts every encoder here accepts
fn flatten_to_8bit(img: &DynamicImage) -> (Vec<u8>, ColorType) {
    if img.color().has_alpha() {
        (img.to_rgba8().into_raw(), ColorType::Rgba8)
    } else {
        (img.to_rgb8().into_raw(), ColorType::Rgb8)
    }
}
