use serde::{Deserialize, Serialize};

/// Sanity bound for request-supplied widths and heights
pub const DEFAULT_MAX_WIDTH_HEIGHT: u32 = 4000;

/// Default quality for lossy formats (JPEG, WebP)
pub const DEFAULT_QUALITY: u8 = 75;

/// Per-source transformation settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Allow `?w=`, `?h=` and `?format=` request arguments to drive the transform
    #[serde(default)]
    pub enable_transform: bool,

    /// Exclusive upper bound for request-supplied dimensions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width_height: Option<u32>,

    /// Quality for lossy output formats
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<u8>,
}

impl TransformConfig {
    /// Configuration with request-driven transforms switched on
    pub fn enabled() -> Self {
        Self {
            enable_transform: true,
            ..Default::default()
        }
    }

    /// The configured bound, falling back to the default when unset or zero
    pub fn effective_max_width_height(&self) -> u32 {
        match self.max_width_height {
            Some(max) if max > 0 => max,
            _ => DEFAULT_MAX_WIDTH_HEIGHT,
        }
    }

    pub fn effective_quality(&self) -> u8 {
        self.quality.unwrap_or(DEFAULT_QUALITY)
    }
}
