use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::error::ScanError;
use crate::models::state::{ScanDiagnostics, ScanOutcome, ScanState};
use crate::traits::scan_delegate::ScanDelegate;

/// Internal mutable session state, protected by `parking_lot::Mutex`.
pub(crate) struct SessionState {
    pub state: ScanState,
    pub diagnostics: ScanDiagnostics,
    pub outcome: Option<ScanOutcome>,
    pub session_id: Option<String>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            state: ScanState::Idle,
            diagnostics: ScanDiagnostics::default(),
            outcome: None,
            session_id: None,
        }
    }
}

/// State and delegate shared between the session handle and its dispatcher.
pub(crate) struct SessionShared {
    inner: Mutex<SessionState>,
    delegate: Mutex<Option<Arc<dyn ScanDelegate>>>,
}

impl SessionShared {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SessionState::new()),
            delegate: Mutex::new(None),
        }
    }

    pub fn set_delegate(&self, delegate: Arc<dyn ScanDelegate>) {
        *self.delegate.lock() = Some(delegate);
    }

    fn delegate(&self) -> Option<Arc<dyn ScanDelegate>> {
        self.delegate.lock().clone()
    }

    pub fn state(&self) -> ScanState {
        self.inner.lock().state.clone()
    }

    pub fn diagnostics(&self) -> ScanDiagnostics {
        self.inner.lock().diagnostics.clone()
    }

    pub fn outcome(&self) -> Option<ScanOutcome> {
        self.inner.lock().outcome.clone()
    }

    pub fn session_id(&self) -> Option<String> {
        self.inner.lock().session_id.clone()
    }

    /// Clear the previous run before a new acquisition.
    pub fn reset(&self, session_id: &str) {
        let mut s = self.inner.lock();
        s.diagnostics = ScanDiagnostics::default();
        s.outcome = None;
        s.session_id = Some(session_id.to_string());
    }

    pub fn set_state(&self, new_state: ScanState) {
        {
            let mut s = self.inner.lock();
            s.state = new_state.clone();
        }
        if let Some(delegate) = self.delegate() {
            delegate.on_state_changed(&new_state);
        }
    }

    /// Count a poll cycle. Does not notify the delegate.
    pub fn begin_cycle(&self) -> u64 {
        let mut s = self.inner.lock();
        s.diagnostics.cycles += 1;
        let cycles = s.diagnostics.cycles;
        s.state = ScanState::Scanning { cycles };
        cycles
    }

    pub fn with_diagnostics(&self, f: impl FnOnce(&mut ScanDiagnostics)) {
        f(&mut self.inner.lock().diagnostics);
    }

    pub fn status(&self, message: &str) {
        if let Some(delegate) = self.delegate() {
            delegate.on_status(message);
        }
    }

    pub fn report_error(&self, error: &ScanError) {
        if let Some(delegate) = self.delegate() {
            delegate.on_error(error);
        }
    }

    /// Record the outcome and notify the delegate. Only the first call for a
    /// run has any effect; later calls return the outcome already recorded.
    pub fn finish(&self, outcome: ScanOutcome) -> ScanOutcome {
        let completed = {
            let mut s = self.inner.lock();
            if let Some(existing) = &s.outcome {
                return existing.clone();
            }
            s.outcome = Some(outcome.clone());
            s.state = ScanState::Completed(outcome.clone());
            s.state.clone()
        };

        if let Some(delegate) = self.delegate() {
            delegate.on_state_changed(&completed);
            delegate.on_scan_finished(&outcome);
        }
        outcome
    }
}
