// Row rendering pipeline - turns a stored image plus its row into a response body

use std::time::Instant;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Response, StatusCode};

use crate::image_transform::{
    image_type_for_bytes, should_transform, transform_image, EncoderQuality, ImageError,
    ImageResponse, QueryArgs, RowValues, TransformConfig,
};

/// Content type used when stored bytes match no known image signature
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// The body served for one row, transformed or passed through
#[derive(Debug, Clone)]
pub struct MediaResponse {
    pub body: Bytes,
    pub content_type: String,
    /// False when the stored bytes were served unchanged
    pub transformed: bool,
}

impl MediaResponse {
    /// Serve stored bytes unchanged, typed by their signature
    pub fn passthrough(data: Bytes) -> Self {
        let content_type = image_type_for_bytes(&data)
            .map(|t| t.content_type())
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());

        Self {
            body: data,
            content_type,
            transformed: false,
        }
    }

    /// Build a `200 OK` HTTP response carrying the body
    pub fn into_http_response(self) -> Result<Response<Bytes>, http::Error> {
        Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, self.content_type)
            .body(self.body)
    }
}

impl From<ImageResponse> for MediaResponse {
    fn from(response: ImageResponse) -> Self {
        let content_type = response.content_type().to_string();
        Self {
            body: response.into_body(),
            content_type,
            transformed: true,
        }
    }
}

/// Render the stored image `data` for `row`
///
/// When neither the row nor the request asks for a transform the original
/// bytes are returned untouched.
pub fn render_row<R>(
    data: &[u8],
    row: &R,
    config: &TransformConfig,
    args: &QueryArgs,
) -> Result<MediaResponse, ImageError>
where
    R: RowValues + ?Sized,
{
    let Some(params) = should_transform(row, config, args)? else {
        tracing::debug!(size = data.len(), "No transform requested, passing through");
        return Ok(MediaResponse::passthrough(Bytes::copy_from_slice(data)));
    };

    let start = Instant::now();
    let transformed = transform_image(data, params.width, params.height)?;
    let quality = EncoderQuality::with_quality(config.effective_quality());
    let response = ImageResponse::new(&transformed, params.format, quality)?;

    tracing::info!(
        variant = %params.to_variant_key(),
        resize = params.has_resize(),
        original_width = transformed.original_size.0,
        original_height = transformed.original_size.1,
        output_width = transformed.output_size.0,
        output_height = transformed.output_size.1,
        input_bytes = data.len(),
        output_bytes = response.body().len(),
        content_type = response.content_type(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Image rendered"
    );

    Ok(response.into())
}
