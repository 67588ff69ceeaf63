use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open document: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for document text extraction backends.
///
/// Implementors provide the low-level text extraction step; field
/// parsing and fraud scoring are agnostic to the extraction technology.
/// The only requirement is determinism: the same document must always
/// yield the same text, so re-ingesting a file is reproducible.
pub trait TextBackend: Send + Sync {
    /// Extract the full plain-text content of a document.
    fn extract_text(&self, path: &Path) -> Result<String, BackendError>;
}
