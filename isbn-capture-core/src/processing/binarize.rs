//! Grayscale + fixed-threshold binarization for the OCR channel.
//!
//! Luminance is the plain average of R, G and B. Pixels darker than the
//! threshold become pure black, the rest pure white. The input frame is never
//! touched; the result is a fresh buffer owned by the caller.

use crate::models::error::ScanError;
use crate::models::frame::{Frame, BYTES_PER_PIXEL};

/// Per-pixel average of the colour channels, ignoring alpha.
pub fn luminance(frame: &Frame) -> Vec<u8> {
    frame
        .pixels()
        .chunks_exact(BYTES_PER_PIXEL)
        .map(|px| average(px[0], px[1], px[2]))
        .collect()
}

/// Binarize a frame into a new black/white RGBA frame.
pub fn binarize(frame: &Frame, threshold: u8) -> Result<Frame, ScanError> {
    let mut out = Vec::with_capacity(frame.pixels().len());
    for px in frame.pixels().chunks_exact(BYTES_PER_PIXEL) {
        let v = if average(px[0], px[1], px[2]) < threshold {
            0
        } else {
            255
        };
        out.extend_from_slice(&[v, v, v, 255]);
    }
    Frame::from_rgba(frame.width(), frame.height(), out)
}

fn average(r: u8, g: u8, b: u8) -> u8 {
    ((r as u16 + g as u16 + b as u16) / 3) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba(pixels: &[[u8; 4]]) -> Vec<u8> {
        pixels.iter().flatten().copied().collect()
    }

    #[test]
    fn luminance_averages_channels() {
        let frame = Frame::from_rgba(2, 1, rgba(&[[30, 60, 90, 255], [255, 0, 0, 0]])).unwrap();
        assert_eq!(luminance(&frame), vec![60, 85]);
    }

    #[test]
    fn threshold_splits_black_and_white() {
        let frame = Frame::from_rgba(
            3,
            1,
            rgba(&[[127, 127, 127, 255], [128, 128, 128, 255], [200, 10, 10, 40]]),
        )
        .unwrap();

        let out = binarize(&frame, 128).unwrap();

        assert_eq!(
            out.pixels(),
            rgba(&[[0, 0, 0, 255], [255, 255, 255, 255], [0, 0, 0, 255]]).as_slice()
        );
    }

    #[test]
    fn pure_black_and_white_is_unchanged() {
        let frame = Frame::from_rgba(
            2,
            2,
            rgba(&[
                [0, 0, 0, 255],
                [255, 255, 255, 255],
                [255, 255, 255, 255],
                [0, 0, 0, 255],
            ]),
        )
        .unwrap();

        let once = binarize(&frame, 128).unwrap();
        let twice = binarize(&once, 128).unwrap();

        assert_eq!(once, frame);
        assert_eq!(twice, frame);
    }

    #[test]
    fn input_frame_is_not_mutated() {
        let frame = Frame::from_luma(2, 1, &[90, 180]).unwrap();
        let before = frame.pixels().to_vec();

        let out = binarize(&frame, 128).unwrap();

        assert_eq!(frame.pixels(), before.as_slice());
        assert!(!out.shares_buffer_with(&frame));
    }
}
