use base64::Engine;
use sha2::{Digest, Sha256};

use super::format::FileCategory;
use super::IngestError;

/// Compute the appropriate hash for an upload.
///
/// Photos and scans get a perceptual hash so near-duplicates match;
/// everything else gets a SHA-256 content hash.
pub fn compute_hash(bytes: &[u8], category: FileCategory) -> Result<String, IngestError> {
    match category {
        FileCategory::Image => compute_perceptual_hash(bytes),
        FileCategory::DigitalPdf
        | FileCategory::ScannedPdf
        | FileCategory::WordDocx
        | FileCategory::WordLegacy
        | FileCategory::PlainText => Ok(compute_content_hash(bytes)),
        FileCategory::Unsupported => Err(IngestError::UnsupportedFormat),
    }
}

/// Compute perceptual hash for an image.
/// DoubleGradient at 16x16 gives a 256-bit hash, robust against
/// re-compression and mild cropping. Uses img_hash's re-exported
/// image crate for decoder compatibility.
pub fn compute_perceptual_hash(bytes: &[u8]) -> Result<String, IngestError> {
    let img = img_hash::image::load_from_memory(bytes)
        .map_err(|e| IngestError::ImageProcessing(e.to_string()))?;

    let hasher = img_hash::HasherConfig::new()
        .hash_alg(img_hash::HashAlg::DoubleGradient)
        .hash_size(16, 16)
        .to_hasher();

    let hash = hasher.hash_image(&img);
    Ok(hash.to_base64())
}

/// Compute SHA-256 content hash for documents and text
pub fn compute_content_hash(bytes: &[u8]) -> String {
    let hash = Sha256::digest(bytes);
    base64::engine::general_purpose::STANDARD.encode(hash)
}

/// Compare two perceptual hashes and return similarity score (0.0-1.0)
pub fn hash_similarity(hash_a: &str, hash_b: &str) -> Option<f64> {
    let a = img_hash::ImageHash::<Vec<u8>>::from_base64(hash_a).ok()?;
    let b = img_hash::ImageHash::<Vec<u8>>::from_base64(hash_b).ok()?;

    let distance = a.dist(&b);
    let max_bits = (a.as_bytes().len() * 8).max(1) as f64;
    Some(1.0 - (distance as f64 / max_bits))
}
