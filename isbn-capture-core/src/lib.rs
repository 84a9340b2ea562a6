//! # isbn-capture-core
//!
//! Platform-agnostic ISBN capture core library.
//!
//! Acquires a camera, runs a barcode channel and an OCR channel against the
//! same still frame on a fixed poll interval, and hands the first identifier
//! that passes validation back to the caller. Backends (cameras, barcode
//! decoders, OCR engines) implement the traits in [`traits`] and plug into
//! the generic [`ScanSession`].
//!
//! ## Architecture
//!
//! ```text
//! isbn-capture-core (this crate)
//! ├── traits/       ← CameraProvider, BarcodeDecoder, TextRecognizer, ScanDelegate
//! ├── models/       ← ScanError, ScanState, ScanOutcome, ScanConfiguration, Frame, Identifier
//! ├── processing/   ← grayscale + binarization, ISBN pattern extraction
//! └── session/      ← ScanSession (capture controller + result dispatcher)
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::candidate::{Candidate, RecognitionSource};
pub use models::config::{FacingHint, ScanConfiguration};
pub use models::error::ScanError;
pub use models::frame::Frame;
pub use models::identifier::{validate, Identifier};
pub use models::state::{ScanDiagnostics, ScanOutcome, ScanState};
pub use processing::binarize::binarize;
pub use processing::patterns::extract_identifier;
pub use session::scan_session::ScanSession;
pub use traits::barcode_decoder::BarcodeDecoder;
pub use traits::camera_provider::{CameraDevice, CameraProvider};
pub use traits::scan_delegate::{CallbackDelegate, ScanDelegate};
pub use traits::text_recognizer::TextRecognizer;
