//! Encoded image responses
//!
//! Picks the output format, encodes the transformed pixels and carries the
//! matching `Content-Type`.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Response, StatusCode};

use super::encoder::{EncoderFactory, EncoderQuality};
use super::error::ImageError;
use super::params::OutputFormat;
use super::processor::TransformedImage;
use super::sniff::ImageType;

/// An encoded image ready to be served
#[derive(Debug, Clone)]
pub struct ImageResponse {
    body: Bytes,
    content_type: String,
    format: OutputFormat,
}

impl ImageResponse {
    /// Encode `transformed` as `format`, or pick a format when `None`
    pub fn new(
        transformed: &TransformedImage,
        format: Option<OutputFormat>,
        quality: EncoderQuality,
    ) -> Result<Self, ImageError> {
        let format = format.unwrap_or_else(|| default_format(transformed));
        let encoded = EncoderFactory::create(format).encode(&transformed.image, quality)?;

        Ok(Self {
            body: Bytes::from(encoded.data),
            content_type: format!("image/{}", format.as_str()).to_lowercase(),
            format,
        })
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// Build a `200 OK` HTTP response carrying the encoded image
    pub fn into_http_response(self) -> Result<Response<Bytes>, http::Error> {
        Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, self.content_type)
            .body(self.body)
    }
}

/// GIF sources stay GIF, images with alpha become PNG, everything else JPEG
pub fn default_format(transformed: &TransformedImage) -> OutputFormat {
    if transformed.source_type == Some(ImageType::Gif) {
        OutputFormat::Gif
    } else if transformed.image.color().has_alpha() {
        OutputFormat::Png
    } else {
        OutputFormat::Jpeg
    }
}
