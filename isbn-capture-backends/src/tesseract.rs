//! OCR through the `tesseract` command-line engine.
//!
//! `initialize` probes the binary and creates a scratch directory. Each
//! `recognize` call writes the frame as PNG, runs one `tesseract` process
//! and reads back its text file. The child is polled rather than waited on,
//! so `terminate` can kill a recognition that is still running.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tempfile::TempDir;

use isbn_capture_core::{Frame, ScanError, TextRecognizer};

use crate::convert::image_from_frame;
use crate::error::BackendError;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Tesseract engine settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TesseractConfig {
    /// Program to run, looked up on `PATH` if not absolute.
    pub program: PathBuf,
    pub language: String,
    /// Page segmentation mode. 6 treats the frame as one block of text.
    pub page_segmentation: u8,
    /// Longest a single recognition may run before it is killed.
    pub max_runtime: Duration,
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("tesseract"),
            language: "eng".into(),
            page_segmentation: 6,
            max_runtime: Duration::from_secs(20),
        }
    }
}

/// [`TextRecognizer`] running the external `tesseract` program.
pub struct TesseractRecognizer {
    config: TesseractConfig,
    workdir: Mutex<Option<TempDir>>,
    child: Mutex<Option<Child>>,
    ready: AtomicBool,
    jobs: AtomicU64,
}

impl TesseractRecognizer {
    pub fn new() -> Self {
        Self::with_config(TesseractConfig::default())
    }

    pub fn with_config(config: TesseractConfig) -> Self {
        Self {
            config,
            workdir: Mutex::new(None),
            child: Mutex::new(None),
            ready: AtomicBool::new(false),
            jobs: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &TesseractConfig {
        &self.config
    }

    /// Whether the engine binary answers `--version`.
    pub fn probe(&self) -> Result<String, ScanError> {
        let output = Command::new(&self.config.program)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                ScanError::EngineUnavailable(format!(
                    "cannot run {}: {}",
                    self.config.program.display(),
                    e
                ))
            })?;
        if !output.status.success() {
            return Err(ScanError::EngineUnavailable(format!(
                "{} --version exited with {}",
                self.config.program.display(),
                output.status
            )));
        }
        // Older releases print the version on stderr
        let text = if output.stdout.is_empty() {
            output.stderr
        } else {
            output.stdout
        };
        Ok(String::from_utf8_lossy(&text)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string())
    }

    fn spawn(&self, input: &Path, output_base: &Path) -> Result<Child, BackendError> {
        Ok(Command::new(&self.config.program)
            .arg(input)
            .arg(output_base)
            .arg("-l")
            .arg(&self.config.language)
            .arg("--psm")
            .arg(self.config.page_segmentation.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?)
    }

    /// Poll the running child until it exits, is killed, or overruns.
    fn await_child(&self) -> Result<(), ScanError> {
        let started = Instant::now();
        loop {
            {
                let mut slot = self.child.lock();
                let Some(child) = slot.as_mut() else {
                    return Err(ScanError::RecognitionFault("recognition terminated".into()));
                };
                match child.try_wait() {
                    Ok(Some(status)) => {
                        slot.take();
                        if status.success() {
                            return Ok(());
                        }
                        return Err(BackendError::EngineExited {
                            program: self.config.program.display().to_string(),
                            status: status.to_string(),
                        }
                        .into());
                    }
                    Ok(None) if started.elapsed() > self.config.max_runtime => {
                        let _ = child.kill();
                        let _ = child.wait();
                        slot.take();
                        return Err(ScanError::RecognitionFault(format!(
                            "recognition exceeded {:?}",
                            self.config.max_runtime
                        )));
                    }
                    Ok(None) => {}
                    Err(e) => {
                        slot.take();
                        return Err(BackendError::Io(e).into());
                    }
                }
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn initialize(&self) -> Result<(), ScanError> {
        let version = self.probe()?;
        let dir = tempfile::Builder::new()
            .prefix("isbn-ocr-")
            .tempdir()
            .map_err(|e| ScanError::EngineUnavailable(format!("no scratch directory: {}", e)))?;
        log::info!("{} ready, scratch dir {}", version, dir.path().display());

        *self.workdir.lock() = Some(dir);
        self.ready.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn recognize(&self, frame: &Frame) -> Result<String, ScanError> {
        if !self.ready.load(Ordering::SeqCst) {
            return Err(ScanError::EngineUnavailable("engine not initialized".into()));
        }
        let dir = match self.workdir.lock().as_ref() {
            Some(d) => d.path().to_path_buf(),
            None => return Err(ScanError::EngineUnavailable("engine terminated".into())),
        };

        let job = self.jobs.fetch_add(1, Ordering::SeqCst);
        let input = dir.join(format!("frame-{}.png", job));
        let output_base = dir.join(format!("frame-{}", job));
        let text_file = output_base.with_extension("txt");

        image_from_frame(frame)
            .map_err(ScanError::from)?
            .save(&input)
            .map_err(|e| ScanError::from(BackendError::from(e)))?;

        let child = self.spawn(&input, &output_base).map_err(|e| {
            ScanError::EngineUnavailable(format!("cannot run tesseract: {}", e))
        })?;
        {
            let mut slot = self.child.lock();
            // Terminated between the readiness check and the spawn
            if !self.ready.load(Ordering::SeqCst) {
                let mut child = child;
                let _ = child.kill();
                let _ = child.wait();
                return Err(ScanError::RecognitionFault("recognition terminated".into()));
            }
            *slot = Some(child);
        }

        let result = self.await_child().and_then(|()| {
            fs::read_to_string(&text_file).map_err(|e| BackendError::Io(e).into())
        });

        let _ = fs::remove_file(&input);
        let _ = fs::remove_file(&text_file);

        let text = result?;
        log::trace!("tesseract read {:?}", text);
        Ok(text)
    }

    fn terminate(&self) -> Result<(), ScanError> {
        self.ready.store(false, Ordering::SeqCst);

        if let Some(mut child) = self.child.lock().take() {
            log::debug!("killing in-flight tesseract process");
            let _ = child.kill();
            let _ = child.wait();
        }

        if let Some(dir) = self.workdir.lock().take() {
            dir.close()
                .map_err(|e| ScanError::ResourceRelease(format!("scratch dir: {}", e)))?;
        }
        Ok(())
    }
}
