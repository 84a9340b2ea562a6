#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use isbn_capture_core::{
    BarcodeDecoder, CameraDevice, CameraProvider, FacingHint, Frame, ScanDelegate, ScanError,
    ScanOutcome, ScanState, TextRecognizer,
};

pub fn gray_frame() -> Frame {
    Frame::from_luma(4, 4, &[100; 16]).unwrap()
}

#[derive(Default)]
pub struct Counters {
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
    pub captures: AtomicUsize,
}

impl Counters {
    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

pub struct MockCamera {
    pub counters: Arc<Counters>,
    start_error: Option<ScanError>,
    stop_error: Option<ScanError>,
    frame: Frame,
    running: bool,
}

impl MockCamera {
    pub fn new() -> Self {
        Self {
            counters: Arc::new(Counters::default()),
            start_error: None,
            stop_error: None,
            frame: gray_frame(),
            running: false,
        }
    }

    pub fn failing(error: ScanError) -> Self {
        Self {
            start_error: Some(error),
            ..Self::new()
        }
    }

    pub fn with_stop_error(mut self, error: ScanError) -> Self {
        self.stop_error = Some(error);
        self
    }
}

impl CameraProvider for MockCamera {
    fn is_available(&self) -> bool {
        !matches!(self.start_error, Some(ScanError::NoCameraFound))
    }

    fn start(&mut self, _facing: FacingHint) -> Result<(), ScanError> {
        self.counters.starts.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = &self.start_error {
            return Err(e.clone());
        }
        self.running = true;
        Ok(())
    }

    fn capture_frame(&mut self) -> Result<Option<Frame>, ScanError> {
        if !self.running {
            return Ok(None);
        }
        self.counters.captures.fetch_add(1, Ordering::SeqCst);
        Ok(Some(self.frame.clone()))
    }

    fn stop(&mut self) -> Result<(), ScanError> {
        self.counters.stops.fetch_add(1, Ordering::SeqCst);
        self.running = false;
        match &self.stop_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    fn device_info(&self) -> CameraDevice {
        CameraDevice {
            id: "mock".into(),
            name: "Mock Camera".into(),
            facing: FacingHint::Environment,
        }
    }
}

/// Replays scripted results, then repeats `fallback`.
pub struct ScriptedBarcode {
    script: Mutex<VecDeque<Result<Option<String>, ScanError>>>,
    fallback: Option<String>,
    pub releases: Arc<AtomicUsize>,
    pub calls: Arc<AtomicUsize>,
}

impl ScriptedBarcode {
    pub fn new(script: Vec<Result<Option<String>, ScanError>>, fallback: Option<&str>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: fallback.map(String::from),
            releases: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn silent() -> Self {
        Self::new(Vec::new(), None)
    }

    pub fn always(text: &str) -> Self {
        Self::new(Vec::new(), Some(text))
    }
}

impl BarcodeDecoder for ScriptedBarcode {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn decode(&self, _frame: &Frame) -> Result<Option<String>, ScanError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().pop_front() {
            Some(result) => result,
            None => Ok(self.fallback.clone()),
        }
    }

    fn release(&self) -> Result<(), ScanError> {
        self.releases.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct EngineCounters {
    pub inits: AtomicUsize,
    pub terminates: AtomicUsize,
    pub recognitions: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub non_binary_frames: AtomicUsize,
}

pub struct MockOcr {
    pub counters: Arc<EngineCounters>,
    text: String,
    delay: Duration,
    init_error: Option<ScanError>,
    panics: bool,
}

impl MockOcr {
    pub fn new(text: &str) -> Self {
        Self {
            counters: Arc::new(EngineCounters::default()),
            text: text.into(),
            delay: Duration::ZERO,
            init_error: None,
            panics: false,
        }
    }

    pub fn blank() -> Self {
        Self::new("")
    }

    pub fn slow(text: &str, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new(text)
        }
    }

    pub fn unavailable() -> Self {
        Self {
            init_error: Some(ScanError::EngineUnavailable("no engine".into())),
            ..Self::blank()
        }
    }

    pub fn panicking() -> Self {
        Self {
            panics: true,
            ..Self::blank()
        }
    }
}

impl TextRecognizer for MockOcr {
    fn name(&self) -> &'static str {
        "mock-ocr"
    }

    fn initialize(&self) -> Result<(), ScanError> {
        self.counters.inits.fetch_add(1, Ordering::SeqCst);
        match &self.init_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    fn recognize(&self, frame: &Frame) -> Result<String, ScanError> {
        let c = &self.counters;
        c.recognitions.fetch_add(1, Ordering::SeqCst);
        let now = c.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        c.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if frame.pixels().iter().any(|&b| b != 0 && b != 255) {
            c.non_binary_frames.fetch_add(1, Ordering::SeqCst);
        }
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        c.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.panics {
            panic!("engine crashed");
        }
        Ok(self.text.clone())
    }

    fn terminate(&self) -> Result<(), ScanError> {
        self.counters.terminates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingDelegate {
    pub outcomes: Mutex<Vec<ScanOutcome>>,
    pub states: Mutex<Vec<ScanState>>,
    pub statuses: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<ScanError>>,
}

impl RecordingDelegate {
    pub fn outcomes(&self) -> Vec<ScanOutcome> {
        self.outcomes.lock().clone()
    }
}

impl ScanDelegate for RecordingDelegate {
    fn on_state_changed(&self, state: &ScanState) {
        self.states.lock().push(state.clone());
    }

    fn on_status(&self, message: &str) {
        self.statuses.lock().push(message.to_string());
    }

    fn on_error(&self, error: &ScanError) {
        self.errors.lock().push(error.clone());
    }

    fn on_scan_finished(&self, outcome: &ScanOutcome) {
        self.outcomes.lock().push(outcome.clone());
    }
}
