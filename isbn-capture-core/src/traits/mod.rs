pub mod barcode_decoder;
pub mod camera_provider;
pub mod scan_delegate;
pub mod text_recognizer;
