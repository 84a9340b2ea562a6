use crate::models::error::ScanError;
use crate::models::frame::Frame;

/// An optical text recognition engine.
///
/// Engines are expensive to bring up, so the session calls `initialize` once
/// when it starts and `terminate` once when it ends. Every method takes
/// `&self`: `terminate` may be called from the dispatcher while a
/// `recognize` call is still running on the OCR worker.
pub trait TextRecognizer: Send + Sync + 'static {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn initialize(&self) -> Result<(), ScanError>;

    /// Recognize text in an already binarized frame.
    fn recognize(&self, frame: &Frame) -> Result<String, ScanError>;

    /// Stop any in-flight recognition and free the engine.
    fn terminate(&self) -> Result<(), ScanError>;
}
