use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::models::candidate::{Candidate, RecognitionSource};
use crate::models::config::ScanConfiguration;
use crate::models::error::ScanError;
use crate::models::frame::Frame;
use crate::models::identifier::{self, Identifier};
use crate::models::state::{ScanDiagnostics, ScanOutcome, ScanState};
use crate::processing::{binarize, patterns};
use crate::traits::barcode_decoder::BarcodeDecoder;
use crate::traits::camera_provider::{CameraDevice, CameraProvider};
use crate::traits::scan_delegate::ScanDelegate;
use crate::traits::text_recognizer::TextRecognizer;

use super::dispatcher::{ChannelSlot, Dispatcher};
use super::shared::SessionShared;
use super::teardown::Teardown;
use super::worker::{self, ScanEvent};

const DECISION_POLL: Duration = Duration::from_millis(25);

/// Camera + dual-channel recognition session.
///
/// Generic over the camera, barcode and OCR backends. One session object
/// owns one camera; `start` acquires it, and every exit path (acceptance,
/// cancel, timeout, camera loss, `stop`, drop) releases it exactly once.
///
/// ```text
///                        ┌→ [barcode worker] ──────────────────────┐
/// [Camera] → [Dispatcher]┤                                          ├→ validate → outcome
///                        └→ [OCR worker: binarize → recognize → extract]┘
/// ```
pub struct ScanSession<C: CameraProvider, B: BarcodeDecoder, T: TextRecognizer> {
    camera: Arc<Mutex<C>>,
    barcode: Arc<B>,
    ocr: Arc<T>,
    config: ScanConfiguration,
    shared: Arc<SessionShared>,

    // Present while a poll loop is (or was) running for the current run
    events: Option<Sender<ScanEvent>>,
    dispatcher_handle: Option<thread::JoinHandle<ScanOutcome>>,
    worker_handles: Vec<thread::JoinHandle<()>>,
    teardown: Option<Arc<Teardown<C, B, T>>>,
}

impl<C: CameraProvider, B: BarcodeDecoder, T: TextRecognizer> ScanSession<C, B, T> {
    pub fn new(camera: C, barcode: B, ocr: T) -> Self {
        Self {
            camera: Arc::new(Mutex::new(camera)),
            barcode: Arc::new(barcode),
            ocr: Arc::new(ocr),
            config: ScanConfiguration::default(),
            shared: Arc::new(SessionShared::new()),
            events: None,
            dispatcher_handle: None,
            worker_handles: Vec::new(),
            teardown: None,
        }
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn ScanDelegate>) {
        self.shared.set_delegate(delegate);
    }

    /// Apply configuration. Not allowed while a scan is running.
    pub fn configure(&mut self, config: ScanConfiguration) -> Result<(), ScanError> {
        if self.is_active() {
            return Err(ScanError::ConfigurationFailed(
                "cannot reconfigure while scanning".into(),
            ));
        }
        config.validate().map_err(ScanError::ConfigurationFailed)?;
        self.config = config;
        Ok(())
    }

    pub fn config(&self) -> &ScanConfiguration {
        &self.config
    }

    pub fn state(&self) -> ScanState {
        self.shared.state()
    }

    pub fn diagnostics(&self) -> ScanDiagnostics {
        self.shared.diagnostics()
    }

    /// The outcome of the current run, once delivered.
    pub fn outcome(&self) -> Option<ScanOutcome> {
        self.shared.outcome()
    }

    pub fn session_id(&self) -> Option<String> {
        self.shared.session_id()
    }

    pub fn device_info(&self) -> CameraDevice {
        self.camera.lock().device_info()
    }

    /// Whether the poll loop is running.
    pub fn is_active(&self) -> bool {
        self.dispatcher_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Acquire the camera, bring up the OCR engine and start polling.
    ///
    /// On `NoCameraFound` / `PermissionDenied` the session moves to
    /// `ScanState::Failed` and the error is returned; `submit_manual` still
    /// works afterwards.
    pub fn start(&mut self) -> Result<(), ScanError> {
        if self.is_active() {
            return Err(ScanError::ConfigurationFailed(
                "a scan is already in progress".into(),
            ));
        }
        self.config.validate().map_err(ScanError::ConfigurationFailed)?;

        // Close out the previous run before reusing the session
        if self.dispatcher_handle.is_some() {
            self.wait();
        } else if self.outcome().is_none() && !self.state().is_idle() {
            self.finish_without_loop();
        }

        let session_id = uuid::Uuid::new_v4().to_string();
        self.shared.reset(&session_id);
        self.shared.set_state(ScanState::Acquiring);

        let teardown = Arc::new(Teardown::new(
            Arc::clone(&self.camera),
            Arc::clone(&self.barcode),
            Arc::clone(&self.ocr),
        ));
        self.teardown = Some(Arc::clone(&teardown));

        let device = self.device_info();
        log::info!("scan session {} acquiring camera {}", session_id, device.name);

        let acquired = {
            let mut camera = self.camera.lock();
            if camera.is_available() {
                camera.start(self.config.facing)
            } else {
                Err(ScanError::NoCameraFound)
            }
        };
        if let Err(e) = acquired {
            return Err(self.fail_acquisition(e));
        }

        let ocr_enabled = self.config.enable_ocr && self.initialize_engine(&teardown)?;

        if let Err(e) = self.spawn_channels(ocr_enabled, teardown) {
            return Err(self.fail_acquisition(e));
        }
        Ok(())
    }

    /// Submit an identifier typed by the user.
    ///
    /// Goes through the same validator as the recognition channels. While
    /// the poll loop runs the dispatcher decides, so `Ok` means this entry
    /// is the delivered outcome. Otherwise (e.g. after the camera could not
    /// be acquired) it completes the session directly.
    pub fn submit_manual(&self, text: &str) -> Result<Identifier, ScanError> {
        let candidate = Candidate::new(text, RecognitionSource::Manual);

        if let Some(events) = &self.events {
            if self.is_active() {
                let (reply, decision) = mpsc::sync_channel(1);
                let event = ScanEvent::Manual {
                    candidate: candidate.clone(),
                    reply,
                };
                if events.send(event).is_ok() {
                    return self.await_decision(&decision);
                }
            }
        }

        let id = identifier::validate(&candidate.raw_text)
            .map_err(|_| ScanError::ManualEntryRejected(candidate.raw_text.trim().to_string()))?;
        if !self.state().accepts_manual_entry() {
            return Err(ScanError::ConfigurationFailed("scan already finished".into()));
        }

        self.release_resources();
        let expected = ScanOutcome::Accepted(id.clone());
        if self.shared.finish(expected.clone()) == expected {
            Ok(id)
        } else {
            Err(ScanError::ConfigurationFailed("scan already finished".into()))
        }
    }

    /// Ask the poll loop to stop with `ScanOutcome::Cancelled`.
    pub fn cancel(&self) {
        if let Some(events) = &self.events {
            if self.is_active() {
                let _ = events.send(ScanEvent::Cancel);
            }
        }
    }

    /// Block until the current run has an outcome.
    ///
    /// With no poll loop running this finalizes the run as stopped: a failed
    /// acquisition yields its `Failed` outcome, anything else `Cancelled`.
    pub fn wait(&mut self) -> ScanOutcome {
        if let Some(handle) = self.dispatcher_handle.take() {
            if handle.join().is_err() {
                log::error!("scan dispatcher panicked");
                self.shared.finish(ScanOutcome::Failed(ScanError::RecognitionFault(
                    "scan dispatcher panicked".into(),
                )));
            }
            self.events = None;
            self.join_workers();
        }

        self.release_resources();
        self.finish_without_loop()
    }

    /// Stop scanning and release the camera. Safe to call any number of
    /// times; only the first call has an effect.
    pub fn stop(&mut self) -> ScanOutcome {
        self.cancel();
        self.wait()
    }

    // --- Internal helpers ---

    /// Wait for the dispatcher's answer to a manual entry. If the loop ends
    /// first the entry was never considered.
    fn await_decision(
        &self,
        decision: &Receiver<Result<Identifier, ScanError>>,
    ) -> Result<Identifier, ScanError> {
        loop {
            match decision.recv_timeout(DECISION_POLL) {
                Ok(result) => return result,
                Err(RecvTimeoutError::Timeout) if self.is_active() => {}
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        decision
            .try_recv()
            .unwrap_or_else(|_| Err(ScanError::ConfigurationFailed("scan already finished".into())))
    }

    fn finish_without_loop(&self) -> ScanOutcome {
        let outcome = match self.state() {
            ScanState::Failed(e) => ScanOutcome::Failed(e),
            _ => ScanOutcome::Cancelled,
        };
        self.shared.finish(outcome)
    }

    fn release_resources(&self) {
        if let Some(teardown) = &self.teardown {
            for fault in teardown.release() {
                self.shared.report_error(&fault);
            }
        }
    }

    fn fail_acquisition(&self, error: ScanError) -> ScanError {
        log::error!("scan could not start: {}", error);
        self.release_resources();
        self.shared.set_state(ScanState::Failed(error.clone()));
        self.shared.report_error(&error);
        error
    }

    /// Returns whether the OCR channel should run.
    fn initialize_engine(&self, teardown: &Teardown<C, B, T>) -> Result<bool, ScanError> {
        match self.ocr.initialize() {
            Ok(()) => {
                teardown.mark_engine_ready();
                log::debug!("{} engine ready", self.ocr.name());
                Ok(true)
            }
            Err(e) if self.config.enable_barcode => {
                log::warn!("{} unavailable, scanning barcodes only: {}", self.ocr.name(), e);
                self.shared.report_error(&e);
                Ok(false)
            }
            Err(e) => Err(self.fail_acquisition(e)),
        }
    }

    fn spawn_channels(
        &mut self,
        ocr_enabled: bool,
        teardown: Arc<Teardown<C, B, T>>,
    ) -> Result<(), ScanError> {
        let (events_tx, events_rx) = mpsc::channel();
        let mut channels = Vec::new();

        if self.config.enable_barcode {
            let decoder = Arc::clone(&self.barcode);
            let (jobs, handle) = worker::spawn_worker(
                RecognitionSource::Barcode,
                events_tx.clone(),
                move |frame: &Frame| decoder.decode(frame),
            )?;
            channels.push(ChannelSlot::new(RecognitionSource::Barcode, jobs));
            self.worker_handles.push(handle);
        }

        if ocr_enabled {
            let engine = Arc::clone(&self.ocr);
            let threshold = self.config.binarize_threshold;
            let (jobs, handle) = worker::spawn_worker(
                RecognitionSource::Ocr,
                events_tx.clone(),
                move |frame: &Frame| {
                    let binary = binarize::binarize(frame, threshold)?;
                    let text = engine.recognize(&binary)?;
                    Ok(patterns::extract_identifier(&text))
                },
            )?;
            channels.push(ChannelSlot::new(RecognitionSource::Ocr, jobs));
            self.worker_handles.push(handle);
        }

        let dispatcher = Dispatcher::new(
            Arc::clone(&self.camera),
            Arc::clone(&self.shared),
            teardown,
            events_rx,
            channels,
            self.config.poll_interval,
            self.config.timeout,
        );

        // Must be set before the dispatcher can complete the run
        self.shared.set_state(ScanState::Scanning { cycles: 0 });

        let handle = thread::Builder::new()
            .name("isbn-scan-dispatcher".into())
            .spawn(move || dispatcher.run())
            .map_err(|e| {
                ScanError::ConfigurationFailed(format!("failed to spawn dispatcher thread: {}", e))
            })?;

        self.events = Some(events_tx);
        self.dispatcher_handle = Some(handle);
        Ok(())
    }

    fn join_workers(&mut self) {
        for handle in self.worker_handles.drain(..) {
            if handle.join().is_err() {
                log::error!("recognition worker panicked");
            }
        }
    }
}

impl<C: CameraProvider, B: BarcodeDecoder, T: TextRecognizer> Drop for ScanSession<C, B, T> {
    fn drop(&mut self) {
        if self.dispatcher_handle.is_some() {
            self.stop();
        } else {
            self.release_resources();
            if !self.state().is_idle() {
                self.finish_without_loop();
            }
        }
    }
}
