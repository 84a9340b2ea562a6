use serde::{Deserialize, Serialize};

/// Which recognition channel produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecognitionSource {
    Barcode,
    Ocr,
    Manual,
}

impl RecognitionSource {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Barcode => "barcode",
            Self::Ocr => "ocr",
            Self::Manual => "manual",
        }
    }
}

/// Unvalidated text proposed by a recognition channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub raw_text: String,
    pub source: RecognitionSource,
}

impl Candidate {
    pub fn new(raw_text: impl Into<String>, source: RecognitionSource) -> Self {
        Self {
            raw_text: raw_text.into(),
            source,
        }
    }
}
