use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::models::candidate::{Candidate, RecognitionSource};
use crate::models::error::ScanError;
use crate::models::frame::Frame;
use crate::models::identifier::{self, Identifier};
use crate::models::state::{ScanOutcome, ScanState};
use crate::traits::barcode_decoder::BarcodeDecoder;
use crate::traits::camera_provider::CameraProvider;
use crate::traits::text_recognizer::TextRecognizer;

use super::shared::SessionShared;
use super::teardown::Teardown;
use super::worker::{ChannelReport, ScanEvent};

/// One recognition channel as seen by the dispatcher.
pub(crate) struct ChannelSlot {
    source: RecognitionSource,
    jobs: Option<Sender<Frame>>,
    busy: bool,
}

impl ChannelSlot {
    pub fn new(source: RecognitionSource, jobs: Sender<Frame>) -> Self {
        Self {
            source,
            jobs: Some(jobs),
            busy: false,
        }
    }
}

/// The poll loop: captures a frame per cycle, fans it out to idle channels,
/// and decides acceptance.
///
/// It is the only reader of the event channel, so at most one identifier is
/// ever accepted per run. Reports still in flight when the loop ends are
/// dropped with the receiver.
pub(crate) struct Dispatcher<C, B, T> {
    camera: Arc<Mutex<C>>,
    shared: Arc<SessionShared>,
    teardown: Arc<Teardown<C, B, T>>,
    events: Receiver<ScanEvent>,
    channels: Vec<ChannelSlot>,
    poll_interval: Duration,
    timeout: Option<Duration>,
    last_rejected: Option<String>,
}

impl<C: CameraProvider, B: BarcodeDecoder, T: TextRecognizer> Dispatcher<C, B, T> {
    pub fn new(
        camera: Arc<Mutex<C>>,
        shared: Arc<SessionShared>,
        teardown: Arc<Teardown<C, B, T>>,
        events: Receiver<ScanEvent>,
        channels: Vec<ChannelSlot>,
        poll_interval: Duration,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            camera,
            shared,
            teardown,
            events,
            channels,
            poll_interval,
            timeout,
            last_rejected: None,
        }
    }

    pub fn run(mut self) -> ScanOutcome {
        let started = Instant::now();
        let deadline = self.timeout.map(|t| started + t);
        let mut next_poll = started;

        let outcome = loop {
            let now = Instant::now();
            if deadline.is_some_and(|d| now >= d) {
                log::info!("scan timed out after {:?}", started.elapsed());
                break ScanOutcome::Failed(ScanError::Timeout);
            }

            if now >= next_poll {
                if let Some(outcome) = self.poll_cycle() {
                    break outcome;
                }
                next_poll = now + self.poll_interval;
                continue;
            }

            let mut wait = next_poll.saturating_duration_since(now);
            if let Some(d) = deadline {
                wait = wait.min(d.saturating_duration_since(now));
            }

            match self.events.recv_timeout(wait) {
                Ok(ScanEvent::Report(report)) => {
                    if let Some(id) = self.consider(report) {
                        break ScanOutcome::Accepted(id);
                    }
                }
                Ok(ScanEvent::Manual { candidate, reply }) => {
                    let decision = self.consider_manual(candidate);
                    let accepted = decision.as_ref().ok().cloned();
                    // The submitter may have given up waiting
                    let _ = reply.send(decision);
                    if let Some(id) = accepted {
                        break ScanOutcome::Accepted(id);
                    }
                }
                Ok(ScanEvent::Cancel) => {
                    log::info!("scan cancelled");
                    break ScanOutcome::Cancelled;
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break ScanOutcome::Cancelled,
            }
        };

        self.shutdown(outcome)
    }

    /// Capture one frame and hand it to every channel that is not busy.
    fn poll_cycle(&mut self) -> Option<ScanOutcome> {
        self.shared.begin_cycle();

        let captured = self.camera.lock().capture_frame();
        let frame = match captured {
            Ok(Some(frame)) => frame,
            Ok(None) => return None,
            Err(e) if e.is_fatal() => {
                log::error!("camera lost: {}", e);
                return Some(ScanOutcome::Failed(e));
            }
            Err(e) => {
                log::warn!("frame capture failed: {}", e);
                self.shared.report_error(&e);
                return None;
            }
        };
        self.shared.with_diagnostics(|d| d.frames_captured += 1);

        let mut running = 0;
        for slot in &mut self.channels {
            let Some(jobs) = &slot.jobs else {
                continue;
            };
            if slot.busy {
                running += 1;
                self.shared.with_diagnostics(|d| d.busy_skips += 1);
                continue;
            }
            if jobs.send(frame.clone()).is_err() {
                log::error!("{} worker stopped unexpectedly", slot.source.label());
                slot.jobs = None;
                continue;
            }
            running += 1;
            slot.busy = true;
            let source = slot.source;
            self.shared.with_diagnostics(|d| match source {
                RecognitionSource::Barcode => d.barcode_attempts += 1,
                RecognitionSource::Ocr => d.ocr_attempts += 1,
                RecognitionSource::Manual => {}
            });
        }

        if running == 0 {
            return Some(ScanOutcome::Failed(ScanError::RecognitionFault(
                "no recognition channel is running".into(),
            )));
        }
        None
    }

    /// Validate a channel report. Returns the identifier if it is accepted.
    fn consider(&mut self, report: ChannelReport) -> Option<Identifier> {
        if let Some(slot) = self.channels.iter_mut().find(|s| s.source == report.source) {
            slot.busy = false;
        }

        let text = match report.result {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("{} channel fault: {}", report.source.label(), e);
                self.shared.with_diagnostics(|d| d.recognition_faults += 1);
                self.shared.report_error(&e);
                return None;
            }
        };

        let candidate = Candidate::new(text, report.source);
        if self.last_rejected.as_deref() == Some(candidate.raw_text.as_str()) {
            self.shared.with_diagnostics(|d| d.duplicates_skipped += 1);
            return None;
        }

        match identifier::validate(&candidate.raw_text) {
            Ok(id) => {
                log::info!("accepted {} from {} channel", id, candidate.source.label());
                Some(id)
            }
            Err(e) => {
                log::debug!("{} candidate rejected: {}", candidate.source.label(), e);
                self.shared.with_diagnostics(|d| d.candidates_rejected += 1);
                self.shared
                    .status(&format!("Scanned \"{}\" is not a valid ISBN", candidate.raw_text));
                self.last_rejected = Some(candidate.raw_text);
                None
            }
        }
    }

    /// Validate a typed entry. A rejection leaves the loop running.
    fn consider_manual(&mut self, candidate: Candidate) -> Result<Identifier, ScanError> {
        match identifier::validate(&candidate.raw_text) {
            Ok(id) => {
                log::info!("manual entry {} accepted", id);
                Ok(id)
            }
            Err(e) => {
                log::debug!("manual entry rejected: {}", e);
                self.shared.with_diagnostics(|d| d.candidates_rejected += 1);
                Err(ScanError::ManualEntryRejected(candidate.raw_text.trim().to_string()))
            }
        }
    }

    /// Stop the channels, release resources, then deliver the outcome.
    fn shutdown(mut self, outcome: ScanOutcome) -> ScanOutcome {
        self.shared.set_state(ScanState::Stopping);

        for slot in &mut self.channels {
            slot.jobs = None;
        }
        for fault in self.teardown.release() {
            self.shared.report_error(&fault);
        }

        let late = self.events.try_iter().count();
        if late > 0 {
            log::debug!("discarding {} late channel reports", late);
        }
        drop(self.events);

        self.shared.finish(outcome)
    }
}
