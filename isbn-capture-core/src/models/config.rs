use std::time::Duration;

/// Which camera to prefer when several are attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FacingHint {
    /// Rear camera, the one pointed at a book.
    #[default]
    Environment,
    User,
    Any,
}

/// Configuration for a scan session.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfiguration {
    /// Time between poll cycles (default: 1500 ms).
    pub poll_interval: Duration,

    /// Camera preference passed to the provider.
    pub facing: FacingHint,

    /// Luminance below this becomes black in the OCR copy (default: 128).
    pub binarize_threshold: u8,

    /// Run the barcode channel (default: true).
    pub enable_barcode: bool,

    /// Run the OCR channel (default: true).
    pub enable_ocr: bool,

    /// Give up after this long (None = until cancelled).
    pub timeout: Option<Duration>,
}

impl ScanConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.poll_interval.is_zero() {
            return Err("poll interval must be positive".into());
        }
        if !self.enable_barcode && !self.enable_ocr {
            return Err("at least one recognition channel must be enabled".into());
        }
        if matches!(self.timeout, Some(t) if t.is_zero()) {
            return Err("timeout must be positive".into());
        }
        Ok(())
    }
}

impl Default for ScanConfiguration {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1500),
            facing: FacingHint::Environment,
            binarize_threshold: 128,
            enable_barcode: true,
            enable_ocr: true,
            timeout: None,
        }
    }
}
