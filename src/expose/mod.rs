//! Exposé rendering — the markdown dialect the model produces and its
//! A4 PDF form.

pub mod markdown;
pub mod pdf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PDF rendering failed: {0}")]
    Pdf(String),

    #[error("Nothing to export — run the analysis first")]
    NoContent,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
