//! Access checks for frame sources.
//!
//! An image folder stands in for a camera: a missing folder means there is
//! no camera, and an unreadable one means access was refused.

use std::fs;
use std::io;
use std::path::Path;

use isbn_capture_core::ScanError;

/// Check whether the frame folder at `dir` can be read.
///
/// `Ok(false)` means it exists but access is denied. A missing folder is
/// `NoCameraFound`.
pub fn check_camera_permission(dir: &Path) -> Result<bool, ScanError> {
    match fs::read_dir(dir) {
        Ok(_) => Ok(true),
        Err(e) => match e.kind() {
            io::ErrorKind::PermissionDenied => Ok(false),
            io::ErrorKind::NotFound => Err(ScanError::NoCameraFound),
            _ => {
                log::warn!("unexpected error checking {}: {}", dir.display(), e);
                Err(ScanError::DeviceNotAvailable(e.to_string()))
            }
        },
    }
}
