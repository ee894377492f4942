//! Error types for the document_builder crate.

use std::io;

use thiserror::Error;

use crate::builder::PdfBuildError;

/// Result type alias for document_builder operations.
pub type Result<T> = std::result::Result<T, DocumentError>;

/// Errors surfaced by the crate.
///
/// Building documents can only fail on an unknown type tag; the remaining variants come from
/// PDF rendering and from reading inputs or writing outputs.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The registry has no factory for the requested tag.
    #[error("Unknown document type: {0}")]
    UnknownDocumentType(String),

    /// Rendering the layout to PDF failed.
    #[error("PDF rendering error: {0}")]
    Pdf(#[from] PdfBuildError),

    /// Field values or layout could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
