use std::io;

use thiserror::Error;

use isbn_capture_core::ScanError;

/// Failures inside a backend before they are mapped onto [`ScanError`].
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("frame of {width}x{height} does not fit its buffer")]
    FrameLayout { width: u32, height: u32 },

    #[error("{program} exited with {status}")]
    EngineExited { program: String, status: String },
}

impl From<BackendError> for ScanError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::Io(ref io) if io.kind() == io::ErrorKind::PermissionDenied => {
                ScanError::PermissionDenied
            }
            other => ScanError::RecognitionFault(other.to_string()),
        }
    }
}
