//! Upload image validation and processing
//!
//! Decodes whatever the user provides, converts to RGB and re-encodes as
//! a bounded JPEG so uploads stay fast and EPS-compatible.

use crate::error::{ListerError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use std::path::Path;

/// Reads an image file, failing early with a clear error.
pub fn load_image_file(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(ListerError::FileNotFound(path.display().to_string()));
    }
    Ok(std::fs::read(path)?)
}

/// Validates the bytes decode as an image, converts to RGB, shrinks to
/// `max_size` on the longest side, and re-encodes as JPEG.
pub fn process_image(image_bytes: &[u8], max_size: u32, jpeg_quality: u8) -> Result<Vec<u8>> {
    let img = image::load_from_memory(image_bytes)
        .map_err(|e| ListerError::ImageLoad(format!("invalid image file: {}", e)))?;

    // Drops alpha channels (PNG etc.) before JPEG encoding
    let img = DynamicImage::ImageRgb8(img.to_rgb8());

    let img = if img.width().max(img.height()) > max_size {
        img.resize(max_size, max_size, FilterType::Lanczos3)
    } else {
        img
    };

    let mut output = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut output, jpeg_quality);
    img.write_with_encoder(encoder)
        .map_err(|e| ListerError::ImageLoad(format!("JPEG encode failed: {}", e)))?;

    Ok(output)
}
