//! Request handlers for the exposé API.
//!
//! The session lock is never held across an await: multipart bodies are
//! buffered first, and extraction runs on the blocking pool with cloned
//! inputs.

use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ApiError;
use super::page;
use crate::config::APP_VERSION;
use crate::expose::{markdown, pdf};
use crate::extract::orchestrator::{Extraction, SourceFile};
use crate::ingest::duplicate::{check_duplicate, DuplicateStatus, ExistingUpload};
use crate::ingest::format::{detect_format, is_allowed, UploadKind, MAX_FILE_SIZE};
use crate::ingest::hash::compute_hash;
use crate::ingest::staging;
use crate::ingest::IngestError;
use crate::session::{StagedUpload, MAX_UPLOADS_PER_SESSION};
use crate::state::AppState;

pub async fn index() -> Html<&'static str> {
    Html(page::INDEX_HTML)
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub model: String,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: APP_VERSION,
        model: state.settings.vision_model.clone(),
    })
}

#[derive(Serialize)]
pub struct SessionCreated {
    pub session_id: Uuid,
}

pub async fn create_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session_id = state.sessions().create();
    tracing::info!(session = %session_id, "Session created");
    (StatusCode::CREATED, Json(SessionCreated { session_id }))
}

/// Full session view for the review page.
#[derive(Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub created_at: chrono::NaiveDateTime,
    pub uploads: Vec<StagedUpload>,
    pub manual_text: String,
    pub extracted: Option<Extraction>,
    pub expose: Option<String>,
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let mut sessions = state.sessions();
    // Polling the review view counts as activity — keeps the session
    // from being swept while someone is still reading it
    let session = sessions
        .get_mut(&id)
        .ok_or_else(|| ApiError::NotFound(format!("Session {id} not found")))?;

    Ok(Json(SessionView {
        session_id: session.session_id,
        created_at: session.created_at,
        uploads: session.uploads.clone(),
        manual_text: session.manual_text.clone(),
        extracted: session.extracted.clone(),
        expose: session.working_copy().map(str::to_string),
    }))
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub files: Vec<StagedUpload>,
}

/// Multipart upload: `file` fields carry the payloads, an optional `kind`
/// field (document|photo) applies to the files that follow it. Documents
/// are the default.
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut kind = UploadKind::Document;
    let mut incoming: Vec<(UploadKind, String, Vec<u8>)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("kind") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Unreadable kind field: {e}")))?;
                kind = parse_kind(&value)?;
            }
            Some("file") => {
                let original_name = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "document".to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Unreadable file field: {e}")))?;
                incoming.push((kind, original_name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    if incoming.is_empty() {
        return Err(ApiError::BadRequest("No file fields in upload".into()));
    }

    let mut sessions = state.sessions();
    let session = sessions
        .get_mut(&id)
        .ok_or_else(|| ApiError::NotFound(format!("Session {id} not found")))?;

    let mut accepted = Vec::new();
    for (kind, original_name, bytes) in incoming {
        if session.uploads.len() >= MAX_UPLOADS_PER_SESSION {
            return Err(ApiError::UploadLimit);
        }

        let detection = detect_format(&bytes);
        if detection.file_size_bytes > MAX_FILE_SIZE {
            return Err(IngestError::FileTooLarge {
                size: detection.file_size_bytes,
                max: MAX_FILE_SIZE,
            }
            .into());
        }
        if !detection.category.is_supported() || !is_allowed(kind, &detection) {
            return Err(ApiError::UnsupportedMedia(format!(
                "{original_name}: {} is not accepted as {}",
                detection.mime_type,
                kind_label(kind)
            )));
        }

        let hash = compute_hash(&bytes, detection.category)?;
        let duplicate = {
            let existing: Vec<ExistingUpload<'_>> = session
                .uploads
                .iter()
                .map(|u| ExistingUpload {
                    file_id: u.file_id,
                    category: u.category,
                    hash: &u.hash,
                })
                .collect();
            check_duplicate(detection.category, &hash, &existing)
        };

        let file_id = Uuid::new_v4();
        let path = staging::stage_file(&state.staging_dir, id, file_id, &original_name, &bytes)?;

        let staged = StagedUpload {
            file_id,
            original_name,
            kind,
            category: detection.category,
            mime_type: detection.mime_type,
            size_bytes: detection.file_size_bytes,
            hash,
            duplicate,
            path,
            received_at: chrono::Local::now().naive_local(),
        };
        tracing::info!(
            session = %id,
            file = %staged.original_name,
            category = staged.category.as_str(),
            size = staged.size_bytes,
            duplicate = staged.duplicate.is_duplicate(),
            "File staged"
        );
        session.uploads.push(staged.clone());
        accepted.push(staged);
    }

    Ok(Json(UploadResponse { files: accepted }))
}

#[derive(Deserialize)]
pub struct TextBody {
    pub text: String,
}

pub async fn set_text(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<TextBody>,
) -> Result<StatusCode, ApiError> {
    let mut sessions = state.sessions();
    let session = sessions
        .get_mut(&id)
        .ok_or_else(|| ApiError::NotFound(format!("Session {id} not found")))?;
    session.manual_text = body.text;
    Ok(StatusCode::NO_CONTENT)
}

/// Run extraction over everything staged so far. Replaces any previous
/// result and discards the edited copy, since it was based on the old run.
pub async fn run_extract(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Extraction>, ApiError> {
    let (sources, manual_text) = {
        let mut sessions = state.sessions();
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| ApiError::NotFound(format!("Session {id} not found")))?;

        let mut sources = Vec::new();
        for upload in &session.uploads {
            // An exact re-upload would only repeat content in the prompt
            if matches!(upload.duplicate, DuplicateStatus::ExactDuplicate { .. }) {
                continue;
            }
            let bytes = staging::read_staged(&upload.path)?;
            sources.push(SourceFile {
                original_name: upload.original_name.clone(),
                category: upload.category,
                bytes,
            });
        }
        (sources, session.manual_text.clone())
    };

    let extractor = state.extractor.clone();
    let extraction =
        tokio::task::spawn_blocking(move || extractor.extract(&sources, &manual_text))
            .await
            .map_err(|e| ApiError::Internal(format!("extraction task: {e}")))??;

    let mut sessions = state.sessions();
    let session = sessions
        .get_mut(&id)
        .ok_or_else(|| ApiError::NotFound(format!("Session {id} not found")))?;
    session.extracted = Some(extraction.clone());
    session.edited = None;

    Ok(Json(extraction))
}

#[derive(Deserialize)]
pub struct ExposeBody {
    pub markdown: String,
}

pub async fn save_expose(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<ExposeBody>,
) -> Result<StatusCode, ApiError> {
    let mut sessions = state.sessions();
    let session = sessions
        .get_mut(&id)
        .ok_or_else(|| ApiError::NotFound(format!("Session {id} not found")))?;
    session.edited = Some(body.markdown);
    Ok(StatusCode::NO_CONTENT)
}

/// Render the working copy as PDF, keep a copy in the exports directory
/// and return the bytes as a download.
pub async fn export_pdf(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let markdown_source = {
        let mut sessions = state.sessions();
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| ApiError::NotFound(format!("Session {id} not found")))?;
        session
            .working_copy()
            .ok_or(ApiError::NoContent)?
            .to_string()
    };

    let title = markdown::title_of(&markdown_source);
    let filename = export_filename(title.as_deref());
    let doc_title = title.unwrap_or_else(|| "Exposé".to_string());

    let bytes = tokio::task::spawn_blocking(move || {
        let blocks = markdown::parse(&markdown_source);
        pdf::render(&blocks, &doc_title)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("render task: {e}")))??;

    let saved = pdf::export_to_file(&bytes, &state.exports_dir, &filename)?;
    tracing::info!(session = %id, path = %saved.display(), "Exposé exported");

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];
    Ok((headers, bytes).into_response())
}

fn parse_kind(value: &str) -> Result<UploadKind, ApiError> {
    match value {
        "document" => Ok(UploadKind::Document),
        "photo" => Ok(UploadKind::Photo),
        other => Err(ApiError::BadRequest(format!("Unknown upload kind: {other}"))),
    }
}

fn kind_label(kind: UploadKind) -> &'static str {
    match kind {
        UploadKind::Document => "a document",
        UploadKind::Photo => "a photo",
    }
}

/// Download filename from the exposé headline, ASCII-safe for the
/// Content-Disposition header.
fn export_filename(title: Option<&str>) -> String {
    let Some(title) = title else {
        return "Expose_Familie.pdf".to_string();
    };

    let mut slug = String::new();
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let slug = slug.trim_matches('_');

    if slug.is_empty() {
        "Expose_Familie.pdf".to_string()
    } else {
        format!("Expose_{slug}.pdf")
    }
}
