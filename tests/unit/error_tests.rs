// Error handling tests: display text and HTTP status mapping

use media_transform::error::MediaError;
use media_transform::image_transform::ImageError;

#[test]
fn test_config_error_display_and_status() {
    let err = MediaError::Config("Unknown source 'photos'".to_string());
    assert_eq!(err.to_string(), "Configuration error: Unknown source 'photos'");
    assert_eq!(err.to_http_status(), 500);
}

#[test]
fn test_image_error_is_transparent() {
    let image_err = ImageError::invalid_param("w", "must be positive");
    let expected = image_err.to_string();

    let err = MediaError::from(image_err);
    assert_eq!(err.to_string(), expected);
    assert_eq!(err.to_http_status(), 400);
}

#[test]
fn test_unsupported_format_maps_to_415() {
    let err = MediaError::from(ImageError::unsupported_format("heic"));
    assert_eq!(err.to_http_status(), 415);
}

#[test]
fn test_encode_failure_maps_to_500() {
    let err = MediaError::from(ImageError::encode_failed("webp", "boom"));
    assert_eq!(err.to_http_status(), 500);
}

#[test]
fn test_json_error_maps_to_400() {
    let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let err = MediaError::from(json_err);
    assert!(err.to_string().starts_with("Row parse error"));
    assert_eq!(err.to_http_status(), 400);
}

#[test]
fn test_io_error_converts() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let err: MediaError = io_err.into();
    assert!(matches!(err, MediaError::Io(_)));
    assert_eq!(err.to_http_status(), 500);
}
