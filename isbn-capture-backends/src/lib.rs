//! # isbn-capture-backends
//!
//! Concrete backends for isbn-capture-core.
//!
//! Provides:
//! - `ImageFolderCamera`: replays still images from a folder as camera frames
//! - `SymbolDecoder`: EAN, UPC and QR decoding through `zedbar`
//! - `TesseractRecognizer`: OCR via the `tesseract` command-line engine
//! - `permissions`: frame source access check
//!
//! ## Usage
//! ```ignore
//! use isbn_capture_backends::{ImageFolderCamera, SymbolDecoder, TesseractRecognizer};
//! use isbn_capture_core::ScanSession;
//!
//! let camera = ImageFolderCamera::new("./frames");
//! let mut session = ScanSession::new(camera, SymbolDecoder::new(), TesseractRecognizer::new());
//! session.start()?;
//! let outcome = session.wait();
//! ```

pub mod barcode;
mod convert;
pub mod error;
pub mod image_folder;
pub mod permissions;
pub mod tesseract;

pub use barcode::SymbolDecoder;
pub use error::BackendError;
pub use image_folder::ImageFolderCamera;
pub use tesseract::{TesseractConfig, TesseractRecognizer};
