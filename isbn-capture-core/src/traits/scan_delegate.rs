use parking_lot::Mutex;

use crate::models::error::ScanError;
use crate::models::identifier::Identifier;
use crate::models::state::{ScanOutcome, ScanState};

/// Event delegate for scan session notifications.
///
/// Methods are called from the session's dispatcher thread, not the thread
/// that started the scan.
pub trait ScanDelegate: Send + Sync {
    /// Called when the session state changes.
    fn on_state_changed(&self, _state: &ScanState) {}

    /// Transient status text, e.g. a rejected candidate.
    fn on_status(&self, _message: &str) {}

    /// Called when an error occurs during scanning.
    fn on_error(&self, _error: &ScanError) {}

    /// Called exactly once with the session's outcome.
    fn on_scan_finished(&self, outcome: &ScanOutcome);
}

type AcceptedFn = Box<dyn FnOnce(Identifier) + Send>;
type CancelledFn = Box<dyn FnOnce() + Send>;

/// Adapts an `on_accepted` / `on_cancelled` callback pair to [`ScanDelegate`].
///
/// Failures are reported as cancellation, since the caller falls back to
/// manual entry in both cases.
pub struct CallbackDelegate {
    on_accepted: Mutex<Option<AcceptedFn>>,
    on_cancelled: Mutex<Option<CancelledFn>>,
}

impl CallbackDelegate {
    pub fn new(
        on_accepted: impl FnOnce(Identifier) + Send + 'static,
        on_cancelled: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            on_accepted: Mutex::new(Some(Box::new(on_accepted))),
            on_cancelled: Mutex::new(Some(Box::new(on_cancelled))),
        }
    }
}

impl ScanDelegate for CallbackDelegate {
    fn on_error(&self, error: &ScanError) {
        log::debug!("scan error: {}", error);
    }

    fn on_scan_finished(&self, outcome: &ScanOutcome) {
        match outcome {
            ScanOutcome::Accepted(id) => {
                if let Some(f) = self.on_accepted.lock().take() {
                    f(id.clone());
                }
            }
            ScanOutcome::Cancelled | ScanOutcome::Failed(_) => {
                if let Some(f) = self.on_cancelled.lock().take() {
                    f();
                }
            }
        }
    }
}
