use thiserror::Error;

/// Errors that can occur while acquiring or recognizing an identifier.
///
/// Only `PermissionDenied`, `NoCameraFound` and `DeviceNotAvailable` are
/// fatal to a session. Recognition and validation errors are reported to the
/// delegate and the poll loop carries on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("no camera found")]
    NoCameraFound,

    #[error("camera not available: {0}")]
    DeviceNotAvailable(String),

    #[error("recognition failed: {0}")]
    RecognitionFault(String),

    #[error("not a valid ISBN: {0}")]
    ValidationRejected(String),

    #[error("please enter a valid ISBN (10 or 13 digits), got: {0}")]
    ManualEntryRejected(String),

    #[error("recognition engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("failed to release resource: {0}")]
    ResourceRelease(String),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("timed out waiting for an ISBN")]
    Timeout,
}

impl ScanError {
    /// Whether this error ends the session rather than a single poll cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied | Self::NoCameraFound | Self::DeviceNotAvailable(_)
        )
    }
}
