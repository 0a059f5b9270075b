// Media Transform Library
// Renders stored images per row and request, the way an image-serving host would

pub mod config;
pub mod error;
pub mod image_transform;
pub mod logging;
pub mod pipeline;
