//! Notion integration self-test handler.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde_json::json;

use athan_core::{NotePageWriter, VoiceNoteData};

use super::require_session;
use crate::{ApiError, AppState};

/// `GET /api/notion/test`
///
/// Verifies the Notion integration end to end: database access, then a
/// sample page written through the same page writer the pipeline uses.
/// The created page can be deleted from Notion afterwards.
pub async fn notion_test(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_session(&state, &headers)?;

    if !state.notion.validate_database().await {
        return Err(ApiError::Internal(
            "Cannot access Notion database. Check that the database ID is correct, \
             the database is shared with your integration, and the API key is valid."
                .to_string(),
        ));
    }

    let test_data = VoiceNoteData {
        title: "Test Voice Note".to_string(),
        summary: "This is a test page created by Athan Notes to verify the Notion \
                  integration is working correctly."
            .to_string(),
        content: "Full test content here. This page was automatically created to test \
                  the connection between Athan Notes and your Notion workspace. If you \
                  see this page with all properties filled correctly, the integration \
                  is working! You can safely delete this test page."
            .to_string(),
        category: "Personal".to_string(),
        tags: vec![
            "test".to_string(),
            "system-check".to_string(),
            "athan-notes".to_string(),
        ],
    };

    let result = state.notion.create_voice_note_page(&test_data).await;
    if result.success {
        Ok(Json(json!({
            "success": true,
            "message": "Test page created successfully in Notion!",
            "pageId": result.page_id,
            "pageUrl": result.page_url,
            "categoryMapped": result.category_mapped,
            "note": "You can safely delete this test page from your Notion database.",
        })))
    } else {
        Err(ApiError::Internal(
            result
                .error
                .unwrap_or_else(|| "Failed to create test page".to_string()),
        ))
    }
}
