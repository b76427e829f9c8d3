//! AI extraction pipeline — turns uploaded material into exposé markdown.
//!
//! Text-bearing documents (digital PDFs, docx) contribute their text
//! layer; photos and scans travel to a local vision model as base64
//! images over the Ollama chat API. One prompt, one response: the model
//! answers with the finished exposé markdown that the review screen shows.

pub mod ollama;
pub mod orchestrator;
pub mod prompt;
pub mod text_sources;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Nothing to analyze — upload at least one file or enter text")]
    NoSources,

    #[error("Cannot reach Ollama at {0}")]
    OllamaConnection(String),

    #[error("Ollama returned HTTP {status}: {body}")]
    OllamaApi { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Failed to parse model response: {0}")]
    ResponseParsing(String),

    #[error("The model returned an empty exposé")]
    EmptyResponse,

    #[error("Cannot read text from PDF '{filename}': {detail}")]
    PdfParsing { filename: String, detail: String },

    #[error("Cannot read text from Word document '{filename}': {detail}")]
    DocxParsing { filename: String, detail: String },

    #[error(
        "'{filename}' is a legacy .doc file — please save it as .docx or PDF and upload again"
    )]
    LegacyWord { filename: String },

    #[error(
        "'{filename}' is a scanned PDF without a text layer — please upload the pages as photos instead"
    )]
    ScannedPdf { filename: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
