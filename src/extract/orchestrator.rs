use std::sync::Arc;

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::ollama::VisionClient;
use super::text_sources;
use super::ExtractError;
use crate::ingest::format::FileCategory;

/// One staged file handed to the extractor.
pub struct SourceFile {
    pub original_name: String,
    pub category: FileCategory,
    pub bytes: Vec<u8>,
}

/// Result of a successful extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extraction {
    pub markdown: String,
    pub model_used: String,
    pub confidence: f32,
    pub extracted_at: chrono::NaiveDateTime,
}

/// Runs the upload-to-exposé extraction: collects text layers, encodes
/// images, builds the prompt and calls the vision model once.
pub struct ExposeExtractor {
    client: Arc<dyn VisionClient>,
    model: String,
}

impl ExposeExtractor {
    pub fn new(client: Arc<dyn VisionClient>, model: String) -> Self {
        Self { client, model }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Extract an exposé from the session's sources.
    ///
    /// Formats that cannot contribute (legacy .doc, scanned PDFs) abort
    /// the run with an error naming the offending file, so the user can
    /// fix the upload instead of silently losing a document.
    pub fn extract(
        &self,
        sources: &[SourceFile],
        manual_text: &str,
    ) -> Result<Extraction, ExtractError> {
        let _span = tracing::info_span!(
            "expose_extract",
            model = %self.model,
            source_count = sources.len(),
        )
        .entered();
        let start = std::time::Instant::now();

        let mut text_parts: Vec<String> = Vec::new();
        if !manual_text.trim().is_empty() {
            text_parts.push(manual_text.trim().to_string());
        }

        let mut images: Vec<String> = Vec::new();

        for source in sources {
            match source.category {
                FileCategory::DigitalPdf => {
                    let text = text_sources::pdf_text(&source.original_name, &source.bytes)?;
                    if !text.is_empty() {
                        text_parts.push(text);
                    }
                }
                FileCategory::WordDocx => {
                    let text = text_sources::docx_text(&source.original_name, &source.bytes)?;
                    if !text.is_empty() {
                        text_parts.push(text);
                    }
                }
                FileCategory::Image => {
                    images.push(base64::engine::general_purpose::STANDARD.encode(&source.bytes));
                }
                FileCategory::WordLegacy => {
                    return Err(ExtractError::LegacyWord {
                        filename: source.original_name.clone(),
                    });
                }
                FileCategory::ScannedPdf => {
                    return Err(ExtractError::ScannedPdf {
                        filename: source.original_name.clone(),
                    });
                }
                FileCategory::PlainText | FileCategory::Unsupported => {
                    // Both are rejected at upload; a stale session entry is
                    // a bug upstream. Pasted text arrives as manual_text.
                    tracing::warn!(file = %source.original_name, "Skipping source that cannot contribute");
                }
            }
        }

        if text_parts.is_empty() && images.is_empty() {
            return Err(ExtractError::NoSources);
        }

        let combined_text = if text_parts.is_empty() {
            None
        } else {
            Some(text_parts.join("\n\n---\n\n"))
        };

        let prompt = super::prompt::build_prompt(combined_text.as_deref(), !images.is_empty());

        let markdown = self
            .client
            .chat_with_images(&self.model, &prompt, &images)?;
        let markdown = markdown.trim().to_string();

        if markdown.is_empty() {
            return Err(ExtractError::EmptyResponse);
        }

        let confidence = compute_heuristic_confidence(&markdown);

        tracing::info!(
            model = %self.model,
            elapsed_ms = %start.elapsed().as_millis(),
            image_count = images.len(),
            markdown_len = markdown.len(),
            confidence,
            "Exposé extraction complete"
        );

        Ok(Extraction {
            markdown,
            model_used: self.model.clone(),
            confidence,
            extracted_at: chrono::Local::now().naive_local(),
        })
    }
}

/// Compute a heuristic confidence score over the returned exposé.
///
/// Vision models give no per-field confidence, so we estimate from
/// output characteristics: length as the primary signal, structure
/// markers (headline, bold headings, bullets) as bonuses. Capped at
/// 0.95 — never claim certainty for heuristic scoring.
fn compute_heuristic_confidence(markdown: &str) -> f32 {
    if markdown.is_empty() {
        return 0.0;
    }

    let len = markdown.len();

    let base: f32 = if len < 50 {
        0.2
    } else if len < 200 {
        0.4
    } else if len < 500 {
        0.6
    } else {
        0.8
    };

    let has_headline = markdown.lines().any(|l| l.starts_with("## "));
    let has_headings = markdown
        .lines()
        .any(|l| l.starts_with("**") && l.trim_end().ends_with("**"));
    let has_bullets = markdown.lines().any(|l| l.trim_start().starts_with("- "));

    let bonus: f32 = if has_headline { 0.05 } else { 0.0 }
        + if has_headings { 0.05 } else { 0.0 }
        + if has_bullets { 0.03 } else { 0.0 };

    (base + bonus).min(0.95)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ollama::MockVisionClient;
    use crate::extract::prompt::EXTRACTION_PROMPT;

    const SAMPLE_EXPOSE: &str = "\
## FAMILIE WEBER AUS DORTMUND

**Familienmitglieder:**
- Thomas Weber, 45, Elektriker
- Sandra Weber, 42, Erzieherin

**Budget:** 12.000 €

**Wünsche für den Garten:**
- Terrasse mit Überdachung
- Spielbereich für die Kinder";

    fn image_source() -> SourceFile {
        SourceFile {
            original_name: "bogen_scan.jpg".into(),
            category: FileCategory::Image,
            bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
        }
    }

    #[test]
    fn extract_from_images_only() {
        let client = Arc::new(MockVisionClient::new(SAMPLE_EXPOSE));
        let extractor = ExposeExtractor::new(client.clone(), "qwen2.5vl:7b".into());

        let result = extractor.extract(&[image_source()], "").unwrap();
        assert!(result.markdown.contains("FAMILIE WEBER"));
        assert_eq!(result.model_used, "qwen2.5vl:7b");

        let call = client.last_call().unwrap();
        assert_eq!(call.image_count, 1);
        assert_eq!(call.prompt, EXTRACTION_PROMPT);
    }

    #[test]
    fn extract_from_text_only() {
        let client = Arc::new(MockVisionClient::new(SAMPLE_EXPOSE));
        let extractor = ExposeExtractor::new(client.clone(), "qwen2.5vl:7b".into());

        let result = extractor
            .extract(&[], "Familie Weber, Budget 12.000 €")
            .unwrap();
        assert!(!result.markdown.is_empty());

        let call = client.last_call().unwrap();
        assert_eq!(call.image_count, 0);
        assert!(call.prompt.contains("Familie Weber, Budget 12.000 €"));
        assert!(!call.prompt.contains("TEXTUELLE INFORMATIONEN"));
    }

    #[test]
    fn extract_combined_labels_text_block() {
        let client = Arc::new(MockVisionClient::new(SAMPLE_EXPOSE));
        let extractor = ExposeExtractor::new(client.clone(), "qwen2.5vl:7b".into());

        extractor
            .extract(&[image_source()], "Notizen aus dem Telefonat")
            .unwrap();

        let call = client.last_call().unwrap();
        assert_eq!(call.image_count, 1);
        assert!(call.prompt.contains("TEXTUELLE INFORMATIONEN:\nNotizen aus dem Telefonat"));
        assert!(call.prompt.ends_with("GESCANNTE DOKUMENTE/BILDER:"));
    }

    #[test]
    fn no_sources_is_an_error() {
        let client = Arc::new(MockVisionClient::new(SAMPLE_EXPOSE));
        let extractor = ExposeExtractor::new(client, "m".into());

        let result = extractor.extract(&[], "   ");
        assert!(matches!(result, Err(ExtractError::NoSources)));
    }

    #[test]
    fn legacy_word_aborts_with_filename() {
        let client = Arc::new(MockVisionClient::new(SAMPLE_EXPOSE));
        let extractor = ExposeExtractor::new(client, "m".into());

        let source = SourceFile {
            original_name: "alt.doc".into(),
            category: FileCategory::WordLegacy,
            bytes: vec![0xD0, 0xCF, 0x11, 0xE0],
        };
        let err = extractor.extract(&[source], "").unwrap_err();
        assert!(err.to_string().contains("alt.doc"), "{err}");
    }

    #[test]
    fn scanned_pdf_aborts_with_advice() {
        let client = Arc::new(MockVisionClient::new(SAMPLE_EXPOSE));
        let extractor = ExposeExtractor::new(client, "m".into());

        let source = SourceFile {
            original_name: "scan.pdf".into(),
            category: FileCategory::ScannedPdf,
            bytes: b"%PDF-1.4".to_vec(),
        };
        let err = extractor.extract(&[source], "").unwrap_err();
        assert!(err.to_string().contains("photos"), "{err}");
    }

    #[test]
    fn empty_model_response_is_an_error() {
        let client = Arc::new(MockVisionClient::new("   "));
        let extractor = ExposeExtractor::new(client, "m".into());

        let result = extractor.extract(&[image_source()], "");
        assert!(matches!(result, Err(ExtractError::EmptyResponse)));
    }

    #[test]
    fn text_file_sources_are_skipped() {
        // Free text reaches extraction as manual_text, never as a file
        let client = Arc::new(MockVisionClient::new(SAMPLE_EXPOSE));
        let extractor = ExposeExtractor::new(client.clone(), "m".into());

        let source = SourceFile {
            original_name: "notizen.txt".into(),
            category: FileCategory::PlainText,
            bytes: b"Garten 400qm, Hanglage".to_vec(),
        };
        extractor
            .extract(&[source, image_source()], "Aus der E-Mail")
            .unwrap();

        let call = client.last_call().unwrap();
        assert!(call.prompt.contains("Aus der E-Mail"));
        assert!(!call.prompt.contains("Garten 400qm, Hanglage"));
    }

    // ── confidence heuristic ──

    #[test]
    fn confidence_empty_is_zero() {
        assert_eq!(compute_heuristic_confidence(""), 0.0);
    }

    #[test]
    fn confidence_short_text_is_low() {
        let c = compute_heuristic_confidence("Hallo");
        assert!((c - 0.2).abs() < f32::EPSILON, "short: {c}");
    }

    #[test]
    fn confidence_structured_expose_scores_high() {
        let text = format!("{SAMPLE_EXPOSE}\n{}", "x".repeat(400));
        let c = compute_heuristic_confidence(&text);
        // 0.8 length + 0.05 headline + 0.05 headings + 0.03 bullets
        assert!((c - 0.93).abs() < 0.01, "structured: {c}");
    }

    #[test]
    fn confidence_capped() {
        let text = format!("## T\n**H**\n- b\n{}", "x".repeat(2000));
        assert!(compute_heuristic_confidence(&text) <= 0.95);
    }
}
