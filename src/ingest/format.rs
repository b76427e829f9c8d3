use serde::{Deserialize, Serialize};

/// Broad file categories we handle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    DigitalPdf,
    ScannedPdf,
    Image,
    WordDocx,
    WordLegacy,
    PlainText,
    Unsupported,
}

impl FileCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DigitalPdf => "digital_pdf",
            Self::ScannedPdf => "scanned_pdf",
            Self::Image => "image",
            Self::WordDocx => "word_docx",
            Self::WordLegacy => "word_legacy",
            Self::PlainText => "plain_text",
            Self::Unsupported => "unsupported",
        }
    }

    /// Categories whose content reaches the vision model as an image.
    pub fn is_visual(&self) -> bool {
        matches!(self, Self::Image | Self::ScannedPdf)
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

/// What the uploader said the file is. Photos have a narrower set of
/// accepted formats than documents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UploadKind {
    /// Casting-Bogen scans, protocols, letters: PDF, Word, PNG, JPG
    Document,
    /// Candidate photos: PNG, JPG, WEBP
    Photo,
}

/// Result of format detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatDetection {
    pub mime_type: String,
    pub category: FileCategory,
    pub file_size_bytes: u64,
}

/// Per-file upload cap. Casting scans from phone cameras stay well under this.
pub const MAX_FILE_SIZE: u64 = 20 * 1024 * 1024;

/// Detect file format from magic bytes (NOT file extensions).
/// Magic bytes don't lie — extensions can be wrong.
pub fn detect_format(bytes: &[u8]) -> FormatDetection {
    let file_size = bytes.len() as u64;

    if file_size > MAX_FILE_SIZE {
        return FormatDetection {
            mime_type: "unknown".into(),
            category: FileCategory::Unsupported,
            file_size_bytes: file_size,
        };
    }

    let (mime_type, category) = match bytes {
        // PDF: starts with %PDF
        [0x25, 0x50, 0x44, 0x46, ..] => {
            let category = if pdf_has_text_layer(bytes) {
                FileCategory::DigitalPdf
            } else {
                FileCategory::ScannedPdf
            };
            ("application/pdf".to_string(), category)
        }
        // JPEG: starts with FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => ("image/jpeg".to_string(), FileCategory::Image),
        // PNG: starts with 89 50 4E 47
        [0x89, 0x50, 0x4E, 0x47, ..] => ("image/png".to_string(), FileCategory::Image),
        // WebP: RIFF....WEBP
        _ if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" => {
            ("image/webp".to_string(), FileCategory::Image)
        }
        // ZIP container: .docx if it holds word/ entries, otherwise unsupported
        [0x50, 0x4B, 0x03, 0x04, ..] => {
            if zip_looks_like_docx(bytes) {
                (
                    "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
                        .to_string(),
                    FileCategory::WordDocx,
                )
            } else {
                ("application/zip".to_string(), FileCategory::Unsupported)
            }
        }
        // Legacy Word: OLE compound file header
        [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1, ..] => {
            ("application/msword".to_string(), FileCategory::WordLegacy)
        }
        _ => {
            if is_likely_text(bytes) {
                ("text/plain".to_string(), FileCategory::PlainText)
            } else {
                (
                    "application/octet-stream".to_string(),
                    FileCategory::Unsupported,
                )
            }
        }
    };

    FormatDetection {
        mime_type,
        category,
        file_size_bytes: file_size,
    }
}

/// Which detected formats each upload kind accepts.
///
/// Documents take PDF, Word and PNG/JPG scans; WEBP is a photo-only
/// format, so the image category alone is not enough for the gate.
pub fn is_allowed(kind: UploadKind, detection: &FormatDetection) -> bool {
    match kind {
        UploadKind::Document => match detection.category {
            FileCategory::DigitalPdf
            | FileCategory::ScannedPdf
            | FileCategory::WordDocx
            | FileCategory::WordLegacy => true,
            FileCategory::Image => detection.mime_type != "image/webp",
            _ => false,
        },
        UploadKind::Photo => detection.category == FileCategory::Image,
    }
}

/// Check if a PDF has an extractable text layer (digital vs scanned).
/// Heuristic: count text-related PDF operators in the first 256KB.
fn pdf_has_text_layer(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(256 * 1024)];
    let content = String::from_utf8_lossy(window);

    // BT/ET = begin/end text, Tj/TJ = show text, Tf = set font
    let text_markers = ["BT", "ET", " Tj", " TJ", " Tf"];
    let marker_count: usize = text_markers
        .iter()
        .map(|m| content.matches(m).count())
        .sum();

    marker_count >= 3
}

/// Cheap check for a docx: the ZIP local file headers carry entry names,
/// and a docx always has entries under `word/`.
fn zip_looks_like_docx(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(4096)];
    window.windows(5).any(|w| w == b"word/")
}

/// Check if bytes are likely plain text (valid UTF-8, mostly printable)
fn is_likely_text(bytes: &[u8]) -> bool {
    if bytes.is_empty() {
        return false;
    }
    let sample = &bytes[..bytes.len().min(4096)];

    let text = match std::str::from_utf8(sample) {
        Ok(t) => t,
        Err(_) => return false,
    };

    // At least 80% printable characters (or whitespace)
    let printable = text
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .count();
    let ratio = printable as f64 / text.chars().count().max(1) as f64;
    ratio > 0.80
}

/// Sanitize a filename — strip path components, special characters, limit length
pub fn sanitize_filename(original: &str) -> String {
    let sanitized: String = original
        .chars()
        .filter(|&c| c != '/' && c != '\\' && c != '\0')
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();

    // Remove consecutive dots (path traversal prevention)
    let sanitized = sanitized.replace("..", "");

    let sanitized: String = sanitized.chars().take(100).collect();
    let trimmed = sanitized.trim();

    if trimmed.is_empty() {
        "document".into()
    } else {
        trimmed.to_string()
    }
}
