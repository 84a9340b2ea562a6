use crate::models::config::FacingHint;
use crate::models::error::ScanError;
use crate::models::frame::Frame;

/// A camera the session can acquire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    pub id: String,
    pub name: String,
    pub facing: FacingHint,
}

/// Interface for platform-specific camera sources.
///
/// Implemented by:
/// - `ImageFolderCamera` (still images on disk, `isbn-capture-backends`)
///
/// The session holds the provider behind a mutex and only ever calls it from
/// its dispatcher thread, so implementations do not need interior locking.
pub trait CameraProvider: Send + 'static {
    /// Whether a camera is present at all.
    fn is_available(&self) -> bool;

    /// Acquire the device and start streaming.
    ///
    /// Fails with `NoCameraFound` or `PermissionDenied`.
    fn start(&mut self, facing: FacingHint) -> Result<(), ScanError>;

    /// Take a snapshot of the live stream. `Ok(None)` if no frame is ready.
    fn capture_frame(&mut self) -> Result<Option<Frame>, ScanError>;

    /// Stop streaming and release the device. Must be safe to call twice.
    fn stop(&mut self) -> Result<(), ScanError>;

    /// Information about the device backing this provider.
    fn device_info(&self) -> CameraDevice;
}
