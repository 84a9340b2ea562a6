use crate::models::error::ScanError;
use crate::models::frame::Frame;

/// Decodes barcode symbols from a still frame.
///
/// `Ok(None)` means no decodable symbol was found, which is the common case
/// and never an error. The returned text is raw and not yet validated.
pub trait BarcodeDecoder: Send + Sync + 'static {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn decode(&self, frame: &Frame) -> Result<Option<String>, ScanError>;

    /// Release decoder resources. Called once when the session ends.
    fn release(&self) -> Result<(), ScanError> {
        Ok(())
    }
}
