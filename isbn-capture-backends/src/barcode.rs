//! Barcode channel backed by the `zedbar` multi-symbology scanner.
//!
//! Book covers carry EAN-13 (Bookland) symbols, but older stock and stickers
//! use UPC-A, UPC-E, EAN-8 or a QR code, so all of those are enabled. The
//! scanner reads the frame as 8-bit grayscale and tries the inverted image
//! too. It also reads lines in both directions, so upside-down covers decode.

use zedbar::config::*;
use zedbar::{DecoderConfig, Image, Scanner};

use isbn_capture_core::processing::binarize::luminance;
use isbn_capture_core::{BarcodeDecoder, Frame, ScanError};

/// [`BarcodeDecoder`] over a `zedbar::Scanner`.
#[derive(Debug, Clone)]
pub struct SymbolDecoder {
    density: u32,
}

impl SymbolDecoder {
    pub fn new() -> Self {
        Self { density: 1 }
    }

    /// Scan every `density`-th row and column. Higher is faster and less thorough.
    pub fn with_density(density: u32) -> Self {
        Self {
            density: density.max(1),
        }
    }

    fn scanner(&self) -> Scanner {
        let config = DecoderConfig::new()
            .enable(Ean13)
            .enable(Isbn13)
            .enable(Isbn10)
            .enable(Ean8)
            .enable(Upca)
            .enable(Upce)
            .enable(QrCode)
            .test_inverted(true)
            .scan_density(self.density, self.density);
        Scanner::with_config(config)
    }

    /// Text of the first symbol found in `frame`.
    pub fn decode_frame(&self, frame: &Frame) -> Result<Option<String>, ScanError> {
        let gray = luminance(frame);
        let mut image = Image::from_gray(&gray, frame.width(), frame.height())
            .map_err(|e| ScanError::RecognitionFault(format!("barcode image: {:?}", e)))?;

        let symbols = self.scanner().scan(&mut image);
        let found = symbols.iter().find_map(|symbol| {
            let text = String::from_utf8_lossy(AsRef::<[u8]>::as_ref(symbol.data()))
                .trim()
                .to_string();
            (!text.is_empty()).then(|| {
                log::debug!("{:?} symbol {}", symbol.symbol_type(), text);
                text
            })
        });
        Ok(found)
    }
}

impl Default for SymbolDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl BarcodeDecoder for SymbolDecoder {
    fn name(&self) -> &'static str {
        "zedbar"
    }

    fn decode(&self, frame: &Frame) -> Result<Option<String>, ScanError> {
        self.decode_frame(frame)
    }
}
