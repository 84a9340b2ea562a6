use std::sync::Arc;

use serde::Serialize;

use isbn_capture_backends::{ImageFolderCamera, SymbolDecoder, TesseractRecognizer};
use isbn_capture_core::{
    ScanDelegate, ScanDiagnostics, ScanError, ScanOutcome, ScanSession, ScanState,
};

pub type Session = ScanSession<ImageFolderCamera, SymbolDecoder, TesseractRecognizer>;

/// ScanDelegate that reports progress on the terminal.
///
/// Status lines go to stderr so stdout carries only the result.
pub struct ConsoleDelegate {
    verbose: bool,
}

impl ConsoleDelegate {
    pub fn new(verbose: bool) -> Arc<Self> {
        Arc::new(Self { verbose })
    }
}

impl ScanDelegate for ConsoleDelegate {
    fn on_state_changed(&self, state: &ScanState) {
        log::debug!("scan state: {}", state.name());
        if self.verbose {
            if let ScanState::Scanning { .. } = state {
                eprintln!("Scanning... point the camera at the barcode or the ISBN line");
            }
        }
    }

    fn on_status(&self, message: &str) {
        eprintln!("{}", message);
    }

    fn on_error(&self, error: &ScanError) {
        match error {
            ScanError::NoCameraFound | ScanError::PermissionDenied => {
                eprintln!("{}. Enter the ISBN manually with --manual.", error)
            }
            ScanError::EngineUnavailable(_) => eprintln!("Text recognition unavailable: {}", error),
            _ => log::warn!("scan error: {}", error),
        }
    }

    fn on_scan_finished(&self, outcome: &ScanOutcome) {
        log::info!("scan finished: {:?}", outcome);
    }
}

/// Serializable diagnostics snapshot.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsInfo {
    pub cycles: u64,
    pub frames_captured: u64,
    pub barcode_attempts: u64,
    pub ocr_attempts: u64,
    pub candidates_rejected: u64,
    pub duplicates_skipped: u64,
    pub busy_skips: u64,
    pub recognition_faults: u64,
}

impl From<ScanDiagnostics> for DiagnosticsInfo {
    fn from(d: ScanDiagnostics) -> Self {
        Self {
            cycles: d.cycles,
            frames_captured: d.frames_captured,
            barcode_attempts: d.barcode_attempts,
            ocr_attempts: d.ocr_attempts,
            candidates_rejected: d.candidates_rejected,
            duplicates_skipped: d.duplicates_skipped,
            busy_skips: d.busy_skips,
            recognition_faults: d.recognition_faults,
        }
    }
}
