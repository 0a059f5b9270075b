//! Transform parameter derivation
//!
//! The effective transform for a row is built in two layers:
//! 1. Row columns: `resize_width`, `resize_height`, `output_format`
//! 2. Request arguments (only when the source enables transforms):
//!    `?w=`, `?h=` and `?format=`
//!
//! Request `w`/`h` replace the row dimensions as a pair rather than being
//! merged with them, and each is bounded by the source's maximum.

use std::collections::HashMap;
use std::str::FromStr;

use serde_json::Value;

use super::config::TransformConfig;
use super::error::ImageError;

pub const WIDTH_COLUMN: &str = "resize_width";
pub const HEIGHT_COLUMN: &str = "resize_height";
pub const FORMAT_COLUMN: &str = "output_format";

pub const WIDTH_ARG: &str = "w";
pub const HEIGHT_ARG: &str = "h";
pub const FORMAT_ARG: &str = "format";

/// Output image format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Jpeg,
    Png,
    Gif,
    WebP,
    Bmp,
    Tiff,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::WebP => "webp",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::WebP => "image/webp",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "gif" => Ok(OutputFormat::Gif),
            "webp" => Ok(OutputFormat::WebP),
            "bmp" => Ok(OutputFormat::Bmp),
            "tiff" | "tif" => Ok(OutputFormat::Tiff),
            _ => Err(ImageError::invalid_param(
                "format",
                format!("unknown format: {}", s),
            )),
        }
    }
}

/// A single database cell as seen by the transform layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnValue {
    Null,
    Integer(i64),
    Text(String),
}

impl From<&Value> for ColumnValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => ColumnValue::Null,
            Value::String(s) => ColumnValue::Text(s.clone()),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ColumnValue::Integer(i),
                None => match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                        ColumnValue::Integer(f as i64)
                    }
                    _ => ColumnValue::Text(n.to_string()),
                },
            },
            other => ColumnValue::Text(other.to_string()),
        }
    }
}

/// Column lookup for a result row
///
/// `None` means the column does not exist in the row at all, which is
/// different from a column holding `ColumnValue::Null`.
pub trait RowValues {
    fn value(&self, column: &str) -> Option<ColumnValue>;

    fn has_column(&self, column: &str) -> bool {
        self.value(column).is_some()
    }
}

impl RowValues for serde_json::Map<String, Value> {
    fn value(&self, column: &str) -> Option<ColumnValue> {
        self.get(column).map(ColumnValue::from)
    }
}

impl RowValues for HashMap<String, ColumnValue> {
    fn value(&self, column: &str) -> Option<ColumnValue> {
        self.get(column).cloned()
    }
}

/// Request query arguments, first value wins for repeated keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryArgs {
    args: HashMap<String, String>,
}

impl QueryArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw query string such as `w=200&format=png`
    ///
    /// A leading `?` is ignored, `+` decodes to a space and keys without a
    /// value map to the empty string.
    pub fn parse(query: &str) -> Self {
        let mut args = HashMap::new();
        let query = query.strip_prefix('?').unwrap_or(query);

        for pair in query.split('&') {
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode_component(key);
            if key.is_empty() {
                continue;
            }
            args.entry(key).or_insert_with(|| decode_component(value));
        }

        Self { args }
    }

    /// Add an argument; like `parse`, an existing key keeps its first value
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.entry(key.into()).or_insert_with(|| value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.args.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.args.contains_key(key)
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(spaced)
}

/// Effective transformation for a single image
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformParams {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: Option<OutputFormat>,
}

impl TransformParams {
    pub fn new(width: Option<u32>, height: Option<u32>, format: Option<OutputFormat>) -> Self {
        Self {
            width,
            height,
            format,
        }
    }

    /// Check if a resize is requested
    pub fn has_resize(&self) -> bool {
        self.width.is_some() || self.height.is_some()
    }

    /// Short key describing the transform, e.g. `w200_fpng`
    pub fn to_variant_key(&self) -> String {
        let mut parts = Vec::new();
        if let Some(w) = self.width {
            parts.push(format!("w{}", w));
        }
        if let Some(h) = self.height {
            parts.push(format!("h{}", h));
        }
        if let Some(f) = self.format {
            parts.push(format!("f{}", f.as_str()));
        }
        if parts.is_empty() {
            "default".to_string()
        } else {
            parts.join("_")
        }
    }
}

/// Transform under construction.
///
/// The outer `Option` tracks whether a key is present at all, the inner one
/// whether it holds a value. A present-but-empty key still counts as a
/// requested transform.
#[derive(Debug, Default)]
struct Draft {
    width: Option<Option<u32>>,
    height: Option<Option<u32>>,
    format: Option<Option<OutputFormat>>,
}

impl Draft {
    fn is_empty(&self) -> bool {
        self.width.is_none() && self.height.is_none() && self.format.is_none()
    }

    fn finish(self) -> Option<TransformParams> {
        if self.is_empty() {
            return None;
        }
        Some(TransformParams {
            width: self.width.flatten(),
            height: self.height.flatten(),
            format: self.format.flatten(),
        })
    }
}

/// Decide whether `row` should be transformed, based on the row, the
/// source configuration and the request arguments
///
/// Returns `Ok(None)` when nothing asks for a transform.
pub fn should_transform<R>(
    row: &R,
    config: &TransformConfig,
    args: &QueryArgs,
) -> Result<Option<TransformParams>, ImageError>
where
    R: RowValues + ?Sized,
{
    let mut draft = Draft::default();

    if [WIDTH_COLUMN, HEIGHT_COLUMN, FORMAT_COLUMN]
        .iter()
        .any(|column| row.has_column(column))
    {
        draft.width = Some(row_dimension(row, WIDTH_COLUMN)?);
        draft.height = Some(row_dimension(row, HEIGHT_COLUMN)?);
        draft.format = Some(row_format(row)?);
    }

    if config.enable_transform {
        let max_width_height = config.effective_max_width_height();

        if let Some(format) = args.get(FORMAT_ARG) {
            draft.format = Some(Some(format.parse()?));
        }

        if args.contains(WIDTH_ARG) || args.contains(HEIGHT_ARG) {
            draft.width = None;
            draft.height = None;
        }

        if let Some(width) = arg_dimension(args, WIDTH_ARG, max_width_height)? {
            draft.width = Some(Some(width));
        }
        if let Some(height) = arg_dimension(args, HEIGHT_ARG, max_width_height)? {
            draft.height = Some(Some(height));
        }
    }

    Ok(draft.finish())
}

fn row_dimension<R>(row: &R, column: &str) -> Result<Option<u32>, ImageError>
where
    R: RowValues + ?Sized,
{
    let value = match row.value(column) {
        None | Some(ColumnValue::Null) => return Ok(None),
        Some(ColumnValue::Integer(i)) => i,
        Some(ColumnValue::Text(s)) => parse_integer(column, &s)?,
    };
    positive_dimension(column, value).map(Some)
}

fn row_format<R>(row: &R) -> Result<Option<OutputFormat>, ImageError>
where
    R: RowValues + ?Sized,
{
    match row.value(FORMAT_COLUMN) {
        None | Some(ColumnValue::Null) => Ok(None),
        Some(ColumnValue::Text(s)) => s.parse().map(Some),
        Some(ColumnValue::Integer(i)) => Err(ImageError::invalid_param(
            FORMAT_COLUMN,
            format!("unknown format: {}", i),
        )),
    }
}

/// Request dimension, `None` when absent or not below the bound
fn arg_dimension(
    args: &QueryArgs,
    key: &str,
    max_width_height: u32,
) -> Result<Option<u32>, ImageError> {
    let Some(raw) = args.get(key) else {
        return Ok(None);
    };
    let value = parse_integer(key, raw)?;
    if value >= i64::from(max_width_height) {
        tracing::debug!(
            arg = key,
            value,
            max_width_height,
            "Ignoring request dimension at or above bound"
        );
        return Ok(None);
    }
    positive_dimension(key, value).map(Some)
}

fn parse_integer(param: &str, raw: &str) -> Result<i64, ImageError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ImageError::invalid_param(param, format!("not an integer: {}", raw)))
}

fn positive_dimension(param: &str, value: i64) -> Result<u32, ImageError> {
    match u32::try_from(value) {
        Ok(px) if px > 0 => Ok(px),
        _ => Err(ImageError::invalid_param(
            param,
            format!("must be a positive pixel count, got {}", value),
        )),
    }
}
