//! Duplicate detection for uploads within a session.
//!
//! Candidates often send the same photo twice (once from the gallery,
//! once re-exported by a messenger at a different resolution). Photos are
//! compared by perceptual-hash similarity, documents by exact content hash.
//! The result is surfaced as a warning on the upload response, never as
//! a hard rejection.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::format::FileCategory;
use super::hash::hash_similarity;

/// Perceptual similarity at or above this is treated as the same photo.
const EXACT_THRESHOLD: f64 = 0.99;
/// Perceptual similarity at or above this is flagged as a near duplicate.
const NEAR_THRESHOLD: f64 = 0.90;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DuplicateStatus {
    New,
    NearDuplicate { of: Uuid, similarity: f64 },
    ExactDuplicate { of: Uuid },
}

impl DuplicateStatus {
    pub fn is_duplicate(&self) -> bool {
        !matches!(self, Self::New)
    }
}

/// An already-staged upload to compare against.
pub struct ExistingUpload<'a> {
    pub file_id: Uuid,
    pub category: FileCategory,
    pub hash: &'a str,
}

/// Check a new upload against the session's existing files.
///
/// Images match other images by perceptual similarity; all other
/// categories match only on identical content hash. The best (highest
/// similarity) match wins when several files are over the threshold.
pub fn check_duplicate(
    category: FileCategory,
    hash: &str,
    existing: &[ExistingUpload<'_>],
) -> DuplicateStatus {
    if category == FileCategory::Image {
        let mut best: Option<(Uuid, f64)> = None;
        for other in existing.iter().filter(|e| e.category == FileCategory::Image) {
            let Some(similarity) = hash_similarity(hash, other.hash) else {
                continue;
            };
            if similarity >= NEAR_THRESHOLD
                && best.map(|(_, s)| similarity > s).unwrap_or(true)
            {
                best = Some((other.file_id, similarity));
            }
        }
        return match best {
            Some((of, similarity)) if similarity >= EXACT_THRESHOLD => {
                DuplicateStatus::ExactDuplicate { of }
            }
            Some((of, similarity)) => DuplicateStatus::NearDuplicate { of, similarity },
            None => DuplicateStatus::New,
        };
    }

    // Documents: byte-identical re-upload only
    for other in existing.iter().filter(|e| e.category == category) {
        if other.hash == hash {
            return DuplicateStatus::ExactDuplicate { of: other.file_id };
        }
    }
    DuplicateStatus::New
}
