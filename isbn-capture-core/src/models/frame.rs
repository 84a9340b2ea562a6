use std::sync::Arc;

use super::error::ScanError;

/// Bytes per pixel of the RGBA8 layout every frame uses.
pub const BYTES_PER_PIXEL: usize = 4;

/// A still snapshot taken from the live camera feed.
///
/// Pixels are RGBA8, row-major, with no stride padding. The buffer is
/// shared and never mutated, so handing the same frame to both recognition
/// channels is safe; preprocessing always produces a new frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
}

impl Frame {
    /// Wrap an RGBA8 buffer. Fails if the buffer does not match the size.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, ScanError> {
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if pixels.len() != expected {
            return Err(ScanError::RecognitionFault(format!(
                "frame buffer is {} bytes, expected {} for {}x{}",
                pixels.len(),
                expected,
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            pixels: pixels.into(),
        })
    }

    /// Build an RGBA frame from single-channel luminance.
    pub fn from_luma(width: u32, height: u32, luma: &[u8]) -> Result<Self, ScanError> {
        let mut rgba = Vec::with_capacity(luma.len() * BYTES_PER_PIXEL);
        for &y in luma {
            rgba.extend_from_slice(&[y, y, y, 255]);
        }
        Self::from_rgba(width, height, rgba)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// One row of RGBA bytes.
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.width as usize * BYTES_PER_PIXEL;
        let start = y as usize * stride;
        &self.pixels[start..start + stride]
    }

    /// Whether two frames share the same underlying buffer.
    pub fn shares_buffer_with(&self, other: &Frame) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}
