//! Conversions between core [`Frame`]s and `image` buffers.

use image::{DynamicImage, RgbaImage};

use isbn_capture_core::Frame;

use crate::error::BackendError;

pub fn frame_from_image(img: DynamicImage) -> Result<Frame, BackendError> {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Frame::from_rgba(width, height, rgba.into_raw())
        .map_err(|_| BackendError::FrameLayout { width, height })
}

pub fn image_from_frame(frame: &Frame) -> Result<RgbaImage, BackendError> {
    RgbaImage::from_raw(frame.width(), frame.height(), frame.pixels().to_vec()).ok_or(
        BackendError::FrameLayout {
            width: frame.width(),
            height: frame.height(),
        },
    )
}
