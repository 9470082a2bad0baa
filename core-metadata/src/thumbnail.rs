//! Thumbnail generation for dataset previews

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{DynamicImage, ImageFormat};
use tracing::debug;

use crate::error::{MetadataError, Result};

/// Decode an image and shrink it to fit within `max_side` x `max_side`,
/// preserving aspect ratio. Images already small enough are not upscaled.
///
/// The result is PNG-encoded.
pub fn thumbnail(bytes: &[u8], max_side: u32) -> Result<Vec<u8>> {
    if max_side == 0 {
        return Err(MetadataError::ImageError(
            "thumbnail size must be positive".to_string(),
        ));
    }

    let img = image::load_from_memory(bytes)
        .map_err(|e| MetadataError::ImageError(format!("Failed to decode image: {}", e)))?;

    let resized = if img.width() > max_side || img.height() > max_side {
        img.thumbnail(max_side, max_side)
    } else {
        img
    };

    let rgba = DynamicImage::ImageRgba8(resized.to_rgba8());
    let mut buffer = Vec::new();
    rgba.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| MetadataError::ImageError(format!("Failed to encode thumbnail: {}", e)))?;

    debug!(
        width = rgba.width(),
        height = rgba.height(),
        size = buffer.len(),
        "Generated thumbnail"
    );
    Ok(buffer)
}

/// [`thumbnail`] encoded as standard base64, ready for a data URI
pub fn thumbnail_base64(bytes: &[u8], max_side: u32) -> Result<String> {
    thumbnail(bytes, max_side).map(|png| STANDARD.encode(png))
}
