//! Upload ingest layer — format detection, hashing, staging, duplicates.
//!
//! Everything a file goes through between the multipart upload and the
//! extraction pipeline: magic-byte format detection, content/perceptual
//! hashing, staged storage under the app data directory, and duplicate
//! photo checks within a session.

pub mod duplicate;
pub mod format;
pub mod hash;
pub mod staging;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported file format")]
    UnsupportedFormat,

    #[error("File too large ({size} bytes, max {max})")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Image processing failed: {0}")]
    ImageProcessing(String),
}
