//! Text extraction from text-bearing document formats.
//!
//! Digital PDFs go through pdf-extract's text layer. Word .docx files are
//! ZIP containers; the body text lives in `word/document.xml` and is
//! recovered by turning paragraph ends into newlines and stripping tags.

use std::io::Read;

use regex::Regex;

use super::ExtractError;

/// Extract the text layer of a digital PDF.
pub fn pdf_text(filename: &str, bytes: &[u8]) -> Result<String, ExtractError> {
    let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::PdfParsing {
        filename: filename.to_string(),
        detail: e.to_string(),
    })?;
    Ok(normalize_whitespace(&text))
}

/// Extract body text from a .docx file.
pub fn docx_text(filename: &str, bytes: &[u8]) -> Result<String, ExtractError> {
    let parse_err = |detail: String| ExtractError::DocxParsing {
        filename: filename.to_string(),
        detail,
    };

    let cursor = std::io::Cursor::new(bytes);
    let mut archive = zip::ZipArchive::new(cursor).map_err(|e| parse_err(e.to_string()))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| parse_err(format!("no word/document.xml: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| parse_err(e.to_string()))?;

    Ok(strip_document_xml(&xml))
}

/// Convert WordprocessingML to plain text: paragraph and break elements
/// become newlines, all remaining tags are dropped, entities decoded.
fn strip_document_xml(xml: &str) -> String {
    let with_breaks = xml
        .replace("</w:p>", "\n")
        .replace("<w:br/>", "\n")
        .replace("<w:tab/>", "\t");

    // Tags carry no text content in WordprocessingML runs
    let tag_re = Regex::new(r"<[^>]+>").expect("static regex");
    let text = tag_re.replace_all(&with_breaks, "");

    let decoded = text
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'");

    normalize_whitespace(&decoded)
}

/// Collapse runs of blank lines and trim line edges.
fn normalize_whitespace(text: &str) -> String {
    let mut out = Vec::new();
    let mut blank_run = 0usize;
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            blank_run += 1;
            if blank_run <= 1 && !out.is_empty() {
                out.push(String::new());
            }
        } else {
            blank_run = 0;
            out.push(trimmed.to_string());
        }
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}
