//! Camera provider backed by a folder of still images.
//!
//! Each poll takes the next image in file-name order, wrapping around at
//! the end unless the camera was built with [`ImageFolderCamera::once`].
//! Supported formats are PNG and JPEG.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use isbn_capture_core::{CameraDevice, CameraProvider, FacingHint, Frame, ScanError};

use crate::convert::frame_from_image;
use crate::error::BackendError;
use crate::permissions::check_camera_permission;

const EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Replays image files as camera frames.
pub struct ImageFolderCamera {
    dir: PathBuf,
    name: String,
    facing: FacingHint,
    frames: Vec<PathBuf>,
    cursor: usize,
    repeat: bool,
    running: bool,
}

impl ImageFolderCamera {
    /// Create a camera that cycles through the images in `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.display().to_string());
        Self {
            dir,
            name,
            facing: FacingHint::Environment,
            frames: Vec::new(),
            cursor: 0,
            repeat: true,
            running: false,
        }
    }

    /// Create a camera that stops producing frames after the last image.
    pub fn once(dir: impl Into<PathBuf>) -> Self {
        Self {
            repeat: false,
            ..Self::new(dir)
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of frames found when the camera was started.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

/// Image files in `dir`, sorted by file name.
pub fn list_frames(dir: &Path) -> Result<Vec<PathBuf>, BackendError> {
    let mut frames = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let supported = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
        if supported && path.is_file() {
            frames.push(path);
        }
    }
    frames.sort();
    Ok(frames)
}

impl CameraProvider for ImageFolderCamera {
    fn is_available(&self) -> bool {
        match check_camera_permission(&self.dir) {
            Ok(true) => list_frames(&self.dir).is_ok_and(|f| !f.is_empty()),
            // Present but locked; `start` reports the denial
            Ok(false) => true,
            Err(_) => false,
        }
    }

    fn start(&mut self, facing: FacingHint) -> Result<(), ScanError> {
        if self.running {
            return Err(ScanError::ConfigurationFailed(
                "camera already running".into(),
            ));
        }
        if !check_camera_permission(&self.dir)? {
            return Err(ScanError::PermissionDenied);
        }

        let frames = list_frames(&self.dir).map_err(ScanError::from)?;
        if frames.is_empty() {
            log::warn!("no images in {}", self.dir.display());
            return Err(ScanError::NoCameraFound);
        }

        if facing != FacingHint::Any {
            self.facing = facing;
        }
        log::info!(
            "image camera {} started with {} frames",
            self.dir.display(),
            frames.len()
        );
        self.frames = frames;
        self.cursor = 0;
        self.running = true;
        Ok(())
    }

    fn capture_frame(&mut self) -> Result<Option<Frame>, ScanError> {
        if !self.running || self.frames.is_empty() {
            return Ok(None);
        }
        if self.cursor >= self.frames.len() {
            if !self.repeat {
                return Ok(None);
            }
            self.cursor = 0;
        }

        let path = &self.frames[self.cursor];
        self.cursor += 1;
        log::trace!("capturing {}", path.display());

        match image::open(path) {
            Ok(img) => Ok(Some(frame_from_image(img)?)),
            Err(image::ImageError::IoError(e)) if e.kind() == io::ErrorKind::NotFound => Err(
                ScanError::DeviceNotAvailable(format!("{} disappeared", path.display())),
            ),
            Err(e) => Err(ScanError::RecognitionFault(format!(
                "could not read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn stop(&mut self) -> Result<(), ScanError> {
        if self.running {
            log::debug!("image camera {} stopped", self.dir.display());
        }
        self.running = false;
        Ok(())
    }

    fn device_info(&self) -> CameraDevice {
        CameraDevice {
            id: self.dir.display().to_string(),
            name: self.name.clone(),
            facing: self.facing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn write_image(dir: &Path, name: &str, shade: u8) {
        GrayImage::from_pixel(4, 3, Luma([shade]))
            .save(dir.join(name))
            .unwrap();
    }

    #[test]
    fn missing_folder_reports_no_camera() {
        let dir = tempfile::tempdir().unwrap();
        let mut camera = ImageFolderCamera::new(dir.path().join("absent"));
        assert!(!camera.is_available());
        assert_eq!(
            camera.start(FacingHint::Environment),
            Err(ScanError::NoCameraFound)
        );
    }

    #[test]
    fn empty_folder_reports_no_camera() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "not an image").unwrap();
        let mut camera = ImageFolderCamera::new(dir.path());
        assert_eq!(
            camera.start(FacingHint::Environment),
            Err(ScanError::NoCameraFound)
        );
    }

    #[test]
    fn frames_come_back_in_name_order_and_wrap() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "b.png", 200);
        write_image(dir.path(), "a.png", 10);

        let mut camera = ImageFolderCamera::new(dir.path());
        camera.start(FacingHint::Environment).unwrap();
        assert_eq!(camera.frame_count(), 2);

        let shades: Vec<u8> = (0..3)
            .map(|_| camera.capture_frame().unwrap().unwrap().pixels()[0])
            .collect();
        assert_eq!(shades, vec![10, 200, 10]);
    }

    #[test]
    fn once_stops_after_last_frame() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "only.png", 90);

        let mut camera = ImageFolderCamera::once(dir.path());
        camera.start(FacingHint::Any).unwrap();
        assert!(camera.capture_frame().unwrap().is_some());
        assert!(camera.capture_frame().unwrap().is_none());
    }

    #[test]
    fn stop_is_idempotent_and_halts_capture() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.png", 90);

        let mut camera = ImageFolderCamera::new(dir.path());
        camera.start(FacingHint::Environment).unwrap();
        camera.stop().unwrap();
        camera.stop().unwrap();
        assert!(camera.capture_frame().unwrap().is_none());
    }

    #[test]
    fn unreadable_image_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.png"), b"definitely not png").unwrap();

        let mut camera = ImageFolderCamera::new(dir.path());
        camera.start(FacingHint::Environment).unwrap();
        let err = camera.capture_frame().unwrap_err();
        assert!(!err.is_fatal());
    }
}
