//! Shared data models for the voice-note pipeline.

use serde::{Deserialize, Serialize};

/// One voice note ready to persist, as handed to the Notion page writer.
///
/// Ephemeral: the Notion database is the system of record, nothing is
/// stored locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceNoteData {
    pub title: String,
    pub summary: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
}

/// Validated output of the model stage, before persistence.
///
/// Same shape as [`VoiceNoteData`], but guaranteed to have passed schema
/// validation: the category is an exact configured name, the title and
/// summary are within bounds, and the tag list is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedNote {
    pub title: String,
    pub content: String,
    pub summary: String,
    pub category: String,
    pub tags: Vec<String>,
}

impl From<ProcessedNote> for VoiceNoteData {
    fn from(note: ProcessedNote) -> Self {
        Self {
            title: note.title,
            summary: note.summary,
            content: note.content,
            category: note.category,
            tags: note.tags,
        }
    }
}

/// Pipeline result returned to the HTTP layer: the validated note enriched
/// with the category icon and the created page's URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedNoteWithMetadata {
    #[serde(flatten)]
    pub note: ProcessedNote,
    pub category_icon: String,
    pub notion_url: String,
}

/// Outcome of a page-creation attempt against the document store.
///
/// Always exactly one of the success/failure shapes; use the constructors
/// to avoid partial states.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePageResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_url: Option<String>,
    /// The category actually recorded, after fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_mapped: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CreatePageResult {
    /// A successful page creation.
    pub fn created(
        page_id: impl Into<String>,
        page_url: impl Into<String>,
        category_mapped: impl Into<String>,
    ) -> Self {
        Self {
            success: true,
            page_id: Some(page_id.into()),
            page_url: Some(page_url.into()),
            category_mapped: Some(category_mapped.into()),
            error: None,
        }
    }

    /// A failed page creation carrying the store's error message.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            page_id: None,
            page_url: None,
            category_mapped: None,
            error: Some(error.into()),
        }
    }
}
