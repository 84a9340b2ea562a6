use super::error::ScanError;
use super::identifier::Identifier;

/// Terminal result of one scan session. Exactly one is produced per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Accepted(Identifier),
    Cancelled,
    Failed(ScanError),
}

impl ScanOutcome {
    pub fn identifier(&self) -> Option<&Identifier> {
        match self {
            Self::Accepted(id) => Some(id),
            _ => None,
        }
    }
}

/// Scan session state machine.
///
/// State transitions:
/// ```text
/// idle → acquiring → scanning → stopping → completed
///            ↓
///          failed   (camera could not be acquired; manual entry still allowed)
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Acquiring,
    Scanning { cycles: u64 },
    Stopping,
    Completed(ScanOutcome),
    Failed(ScanError),
}

impl ScanState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Manual entry is accepted until an outcome has been delivered.
    pub fn accepts_manual_entry(&self) -> bool {
        !self.is_terminal() && !matches!(self, Self::Stopping)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Acquiring => "acquiring",
            Self::Scanning { .. } => "scanning",
            Self::Stopping => "stopping",
            Self::Completed(_) => "completed",
            Self::Failed(_) => "failed",
        }
    }
}

/// Counters for debugging scan sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanDiagnostics {
    pub cycles: u64,
    pub frames_captured: u64,
    pub barcode_attempts: u64,
    pub ocr_attempts: u64,
    pub candidates_rejected: u64,
    pub duplicates_skipped: u64,
    pub busy_skips: u64,
    pub recognition_faults: u64,
}
