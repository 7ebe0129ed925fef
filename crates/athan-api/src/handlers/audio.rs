//! Voice-note processing HTTP handlers.

use axum::extract::{Multipart, State};
use axum::http::HeaderMap;
use axum::Json;
use serde_json::json;
use tracing::info;

use athan_core::{defaults, ProcessedNoteWithMetadata};
use athan_inference::validate_audio_upload;

use super::require_session;
use crate::{ApiError, AppState};

/// `POST /api/process-audio`
///
/// Accepts multipart/form-data with an `audio` field and runs the full
/// pipeline: Gemini transcription with model fallback, schema validation,
/// and the Notion page write. Requires an authenticated session.
///
/// Responses:
/// - 200 with the processed note (including `categoryIcon` and `notionUrl`)
/// - 400 when the upload is missing, oversized, or an unsupported format
/// - 401 without a valid session
/// - 502 when Gemini returned data that fails schema validation
/// - 500 for everything else, with the pipeline's message in `error`
pub async fn process_audio(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<ProcessedNoteWithMetadata>, ApiError> {
    require_session(&state, &headers)?;

    let mut audio: Option<Vec<u8>> = None;
    let mut content_type: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Multipart error: {}", e)))?
    {
        if field.name() == Some("audio") {
            content_type = field.content_type().map(|c| c.to_string());
            audio = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Read error: {}", e)))?
                    .to_vec(),
            );
        }
    }

    let audio = audio.ok_or_else(|| ApiError::BadRequest("No audio file provided".to_string()))?;
    let mime_type = content_type
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| defaults::DEFAULT_AUDIO_MIME_TYPE.to_string());

    validate_audio_upload(audio.len(), &mime_type)?;

    info!(
        audio_bytes = audio.len(),
        mime_type = %mime_type,
        "Processing voice note"
    );
    let note = state.pipeline.process(&audio, &mime_type).await?;
    Ok(Json(note))
}

/// `GET /api/process-audio`
///
/// Static description of the endpoint contract.
pub async fn process_audio_info(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "endpoint": "/api/process-audio",
        "method": "POST",
        "description": "Process Burmese voice notes with Gemini AI",
        "authentication": "Required (session-based)",
        "requestFormat": "multipart/form-data",
        "requestFields": {
            "audio": "Audio file (required) - WebM, WAV, MP3, M4A, OGG, FLAC",
        },
        "constraints": {
            "maxFileSize": "50MB",
            "language": "Burmese (my-MM)",
        },
        "responseFormat": {
            "title": "string (original language as spoken - Burmese, English, or mixed, max 10 words)",
            "content": "string (full transcription in Burmese)",
            "summary": "string (1-2 sentences in Burmese)",
            "category": state.registry.names().join(" | "),
            "tags": "string[] (3-5 tags in English only)",
            "categoryIcon": "string (emoji for the mapped category)",
            "notionUrl": "string (URL of the created Notion page)",
        },
    }))
}
