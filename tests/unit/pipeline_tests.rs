// Pipeline tests: render_row end to end with JSON rows and query strings

use image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};
use media_transform::config::Config;
use media_transform::image_transform::{ImageError, QueryArgs, TransformConfig};
use media_transform::pipeline::render_row;
use serde_json::{json, Map, Value};
use std::io::Cursor;

fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).expect("Failed to encode fixture");
    buf.into_inner()
}

fn rgb_png(width: u32, height: u32) -> Vec<u8> {
    encode(
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([200, 10, 10]))),
        ImageFormat::Png,
    )
}

fn rgba_png(width: u32, height: u32) -> Vec<u8> {
    encode(
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            image::Rgba([10, 200, 10, 128]),
        )),
        ImageFormat::Png,
    )
}

fn row(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("row fixture must be an object"),
    }
}

fn dimensions(body: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory(body).expect("Rendered body must decode");
    (img.width(), img.height())
}

#[test]
fn test_row_without_transform_columns_passes_through() {
    let data = rgb_png(10, 10);
    let response = render_row(
        &data,
        &row(json!({"id": 1, "caption": "hello"})),
        &TransformConfig::enabled(),
        &QueryArgs::new(),
    )
    .unwrap();

    assert!(!response.transformed);
    assert_eq!(response.body.as_ref(), data.as_slice());
    assert_eq!(response.content_type, "image/png");
}

#[test]
fn test_null_format_column_still_transforms() {
    // A present column counts even when NULL; default format applies
    let data = rgb_png(10, 10);
    let response = render_row(
        &data,
        &row(json!({"output_format": null})),
        &TransformConfig::default(),
        &QueryArgs::new(),
    )
    .unwrap();

    assert!(response.transformed);
    assert_eq!(response.content_type, "image/jpeg");
    assert_eq!(dimensions(&response.body), (10, 10));
}

#[test]
fn test_alpha_defaults_to_png() {
    let data = rgba_png(20, 10);
    let response = render_row(
        &data,
        &row(json!({"resize_height": 5})),
        &TransformConfig::default(),
        &QueryArgs::new(),
    )
    .unwrap();

    assert_eq!(response.content_type, "image/png");
    assert_eq!(dimensions(&response.body), (10, 5));
}

#[test]
fn test_gif_source_defaults_to_gif() {
    let data = encode(
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, image::Rgba([1, 2, 3, 255]))),
        ImageFormat::Gif,
    );
    let response = render_row(
        &data,
        &row(json!({"resize_width": 4})),
        &TransformConfig::default(),
        &QueryArgs::new(),
    )
    .unwrap();

    assert_eq!(response.content_type, "image/gif");
    assert_eq!(&response.body[0..3], b"GIF");
    assert_eq!(dimensions(&response.body), (4, 4));
}

#[test]
fn test_query_width_replaces_both_row_dimensions() {
    let data = rgb_png(40, 20);
    let response = render_row(
        &data,
        &row(json!({"resize_width": 10, "resize_height": 10})),
        &TransformConfig::enabled(),
        &QueryArgs::parse("w=20"),
    )
    .unwrap();

    assert_eq!(dimensions(&response.body), (20, 10));
}

#[test]
fn test_query_width_at_bound_is_ignored() {
    let data = rgb_png(40, 20);
    let config = TransformConfig {
        enable_transform: true,
        max_width_height: Some(30),
        quality: None,
    };
    let response = render_row(
        &data,
        &row(json!({"resize_width": 10})),
        &config,
        &QueryArgs::parse("w=30"),
    )
    .unwrap();

    // Row dimensions were discarded and the request width rejected: no resize
    assert!(response.transformed);
    assert_eq!(dimensions(&response.body), (40, 20));
}

#[test]
fn test_query_format_webp() {
    let data = rgb_png(16, 16);
    let response = render_row(
        &data,
        &row(json!({})),
        &TransformConfig::enabled(),
        &QueryArgs::parse("?format=webp&h=8"),
    )
    .unwrap();

    assert_eq!(response.content_type, "image/webp");
    assert_eq!(&response.body[0..4], b"RIFF");
    assert_eq!(&response.body[8..12], b"WEBP");
}

#[test]
fn test_unknown_query_format_is_bad_request() {
    let data = rgb_png(16, 16);
    let err = render_row(
        &data,
        &row(json!({})),
        &TransformConfig::enabled(),
        &QueryArgs::parse("format=svg"),
    )
    .unwrap_err();

    assert_eq!(err.to_http_status(), 400);
}

#[test]
fn test_derived_height_above_pixel_limit_is_bad_request() {
    let data = rgb_png(1, 1000);
    let err = render_row(
        &data,
        &row(json!({})),
        &TransformConfig::enabled(),
        &QueryArgs::parse("w=3999"),
    )
    .unwrap_err();

    assert!(matches!(err, ImageError::InvalidDimensions { .. }));
    assert_eq!(err.to_http_status(), 400);
}

#[test]
fn test_webp_too_wide_for_libwebp_is_server_error() {
    let data = rgb_png(16384, 1);
    let err = render_row(
        &data,
        &row(json!({"output_format": "webp"})),
        &TransformConfig::default(),
        &QueryArgs::new(),
    )
    .unwrap_err();

    assert!(matches!(err, ImageError::EncodeFailed { .. }));
    assert_eq!(err.to_http_status(), 500);
}

#[test]
fn test_render_with_source_from_config() {
    let config = Config::from_yaml_with_env(
        r#"
sources:
  photos:
    enable_transform: true
    max_width_height: 100
    quality: 90
"#,
    )
    .unwrap();
    let source = config.source("photos").unwrap();

    let data = rgb_png(50, 25);
    let response =
        render_row(&data, &row(json!({})), source, &QueryArgs::parse("w=25&format=bmp")).unwrap();

    assert_eq!(response.content_type, "image/bmp");
    assert_eq!(dimensions(&response.body), (25, 12));
}

#[test]
fn test_http_response_carries_content_type() {
    let data = rgb_png(4, 4);
    let response = render_row(
        &data,
        &row(json!({"output_format": "jpeg"})),
        &TransformConfig::default(),
        &QueryArgs::new(),
    )
    .unwrap();

    let http_response = response.into_http_response().unwrap();
    assert_eq!(http_response.status(), http::StatusCode::OK);
    assert_eq!(
        http_response.headers()[http::header::CONTENT_TYPE],
        "image/jpeg"
    );
}
