use thiserror::Error;

use isbn_capture_core::ScanError;

/// Errors surfaced by the catalog commands.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("lookup failed: {0}")]
    Lookup(String),

    #[error(transparent)]
    Scan(#[from] ScanError),
}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        Self::Storage(e.to_string())
    }
}
