//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::expose::ExportError;
use crate::extract::ExtractError;
use crate::ingest::IngestError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Nothing to analyze — upload at least one file or enter text")]
    NoSources,
    #[error("Unsupported file type: {0}")]
    UnsupportedMedia(String),
    #[error("File too large: {0}")]
    PayloadTooLarge(String),
    #[error("Upload limit reached for this session")]
    UploadLimit,
    #[error("Unusable source: {0}")]
    UnusableSource(String),
    #[error("No exposé content yet — run the analysis first")]
    NoContent,
    #[error("Extraction backend unavailable: {0}")]
    ExtractorUnavailable(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail.clone()),
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
            ApiError::NoSources => (
                StatusCode::BAD_REQUEST,
                "NO_SOURCES",
                self.to_string(),
            ),
            ApiError::UnsupportedMedia(detail) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_MEDIA",
                detail.clone(),
            ),
            ApiError::PayloadTooLarge(detail) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                detail.clone(),
            ),
            ApiError::UploadLimit => (
                StatusCode::TOO_MANY_REQUESTS,
                "UPLOAD_LIMIT",
                self.to_string(),
            ),
            ApiError::UnusableSource(detail) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNUSABLE_SOURCE",
                detail.clone(),
            ),
            ApiError::NoContent => (StatusCode::CONFLICT, "NO_CONTENT", self.to_string()),
            ApiError::ExtractorUnavailable(detail) => (
                StatusCode::BAD_GATEWAY,
                "EXTRACTOR_UNAVAILABLE",
                detail.clone(),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::UnsupportedFormat => ApiError::UnsupportedMedia(
                "File type not supported. Please send a PDF, Word document or image.".into(),
            ),
            IngestError::FileTooLarge { size, max } => ApiError::PayloadTooLarge(format!(
                "File is {size} bytes, maximum is {max}"
            )),
            IngestError::ImageProcessing(detail) => {
                ApiError::BadRequest(format!("Cannot read image: {detail}"))
            }
            IngestError::Io(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<ExtractError> for ApiError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::NoSources => ApiError::NoSources,
            ExtractError::OllamaConnection(_)
            | ExtractError::OllamaApi { .. }
            | ExtractError::HttpClient(_)
            | ExtractError::ResponseParsing(_)
            | ExtractError::EmptyResponse => ApiError::ExtractorUnavailable(err.to_string()),
            ExtractError::PdfParsing { .. }
            | ExtractError::DocxParsing { .. }
            | ExtractError::LegacyWord { .. }
            | ExtractError::ScannedPdf { .. } => ApiError::UnusableSource(err.to_string()),
            ExtractError::Io(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::NoContent => ApiError::NoContent,
            ExportError::Pdf(detail) => ApiError::Internal(detail),
            ExportError::Io(e) => ApiError::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn not_found_returns_404() {
        let response = ApiError::NotFound("Session not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn no_sources_returns_400() {
        let response = ApiError::NoSources.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "NO_SOURCES");
    }

    #[tokio::test]
    async fn unsupported_media_returns_415() {
        let err: ApiError = IngestError::UnsupportedFormat.into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn upload_limit_returns_429() {
        let response = ApiError::UploadLimit.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn ollama_down_maps_to_502() {
        let err: ApiError = ExtractError::OllamaConnection("http://localhost:11434".into()).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "EXTRACTOR_UNAVAILABLE");
    }

    #[tokio::test]
    async fn scanned_pdf_maps_to_422() {
        let err: ApiError = ExtractError::ScannedPdf {
            filename: "scan.pdf".into(),
        }
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("scan.pdf"));
    }

    #[tokio::test]
    async fn export_without_content_maps_to_409() {
        let err: ApiError = ExportError::NoContent.into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn internal_hides_details() {
        let response = ApiError::Internal("db exploded".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["message"], "An internal error occurred");
    }
}
