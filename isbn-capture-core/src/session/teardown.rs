use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::error::ScanError;
use crate::traits::barcode_decoder::BarcodeDecoder;
use crate::traits::camera_provider::CameraProvider;
use crate::traits::text_recognizer::TextRecognizer;

/// Releases everything a session acquired, at most once.
///
/// Each step runs under its own guard: an error or panic in one step is
/// collected and the remaining steps still run.
pub(crate) struct Teardown<C, B, T> {
    camera: Arc<Mutex<C>>,
    barcode: Arc<B>,
    ocr: Arc<T>,
    engine_ready: AtomicBool,
    released: AtomicBool,
}

impl<C: CameraProvider, B: BarcodeDecoder, T: TextRecognizer> Teardown<C, B, T> {
    pub fn new(camera: Arc<Mutex<C>>, barcode: Arc<B>, ocr: Arc<T>) -> Self {
        Self {
            camera,
            barcode,
            ocr,
            engine_ready: AtomicBool::new(false),
            released: AtomicBool::new(false),
        }
    }

    /// The OCR engine finished initializing and needs terminating.
    pub fn mark_engine_ready(&self) {
        self.engine_ready.store(true, Ordering::SeqCst);
    }

    /// Run every release step once. Returns the faults encountered; a second
    /// call does nothing and returns no faults.
    pub fn release(&self) -> Vec<ScanError> {
        if self.released.swap(true, Ordering::SeqCst) {
            return Vec::new();
        }

        let mut faults = Vec::new();

        if self.engine_ready.swap(false, Ordering::SeqCst) {
            faults.extend(guarded("terminate OCR engine", || self.ocr.terminate()));
        }
        faults.extend(guarded("stop camera", || self.camera.lock().stop()));
        faults.extend(guarded("release barcode decoder", || self.barcode.release()));

        if faults.is_empty() {
            log::debug!("scan resources released");
        }
        faults
    }
}

fn guarded(step: &str, f: impl FnOnce() -> Result<(), ScanError>) -> Option<ScanError> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => None,
        Ok(Err(e)) => {
            log::warn!("failed to {}: {}", step, e);
            Some(ScanError::ResourceRelease(format!("{}: {}", step, e)))
        }
        Err(_) => {
            log::error!("{} panicked", step);
            Some(ScanError::ResourceRelease(format!("{} panicked", step)))
        }
    }
}
