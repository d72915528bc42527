//! Artwork encoding shared by the session reader, the publisher and the widget.
//!
//! Artwork travels as PNG bytes inside a snapshot and as base64 text inside the
//! persisted record and the command channel.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::ImageFormat;
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArtworkError {
    #[error("artwork is empty")]
    Empty,
    #[error("invalid base64 artwork: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("invalid image data: {0}")]
    Image(#[from] image::ImageError),
}

/// Decoded artwork ready for painting
#[derive(Clone, PartialEq, Eq)]
pub struct DecodedArtwork {
    pub width: u32,
    pub height: u32,
    /// RGBA pixel data (4 bytes per pixel)
    pub rgba: Vec<u8>,
}

impl std::fmt::Debug for DecodedArtwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedArtwork")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("rgba_len", &self.rgba.len())
            .finish()
    }
}

/// Re-encode any supported image (PNG, JPEG) as PNG
pub fn encode_png(bytes: &[u8]) -> Result<Vec<u8>, ArtworkError> {
    if bytes.is_empty() {
        return Err(ArtworkError::Empty);
    }
    let image = image::load_from_memory(bytes)?;
    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}

pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode base64 artwork text; whitespace (line breaks included) is ignored
pub fn from_base64(text: &str) -> Result<Vec<u8>, ArtworkError> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(ArtworkError::Empty);
    }
    Ok(STANDARD.decode(compact)?)
}

/// Decode image bytes into RGBA pixels
pub fn decode_rgba(bytes: &[u8]) -> Result<DecodedArtwork, ArtworkError> {
    if bytes.is_empty() {
        return Err(ArtworkError::Empty);
    }
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    Ok(DecodedArtwork {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    })
}

#[cfg(test)]
pub(crate) fn sample_png() -> Vec<u8> {
    let pixels = image::RgbaImage::from_fn(3, 2, |x, y| image::Rgba([x as u8 * 80, y as u8 * 120, 200, 255]));
    let mut png = Vec::new();
    image::DynamicImage::ImageRgba8(pixels)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .unwrap();
    png
}
