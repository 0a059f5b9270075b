//! Image transformation module
//!
//! Turns stored image bytes into a response body:
//! - Detects the image type from its leading bytes (including HEIC brands)
//! - Derives width/height/format from row columns and request arguments
//! - Corrects EXIF orientation and resizes
//! - Re-encodes to JPEG, PNG, GIF, WebP, BMP or TIFF
//!
//! # Request Arguments
//!
//! When the source enables transforms, request arguments override the row:
//! ```text
//! /media/photos/42?w=400&format=webp
//! ```

pub mod config;
pub mod encoder;
pub mod error;
pub mod orientation;
pub mod params;
pub mod processor;
pub mod response;
pub mod sniff;

pub use config::{TransformConfig, DEFAULT_MAX_WIDTH_HEIGHT, DEFAULT_QUALITY};
pub use encoder::{EncodedImage, EncoderFactory, EncoderQuality, ImageEncoder};
pub use error::ImageError;
pub use orientation::{apply_orientation, read_orientation};
pub use params::{
    should_transform, ColumnValue, OutputFormat, QueryArgs, RowValues, TransformParams,
};
pub use processor::{transform_image, TransformedImage, MAX_OUTPUT_PIXELS};
pub use response::{default_format, ImageResponse};
pub use sniff::{image_type_for_bytes, ImageType};
