//! Backend trait seams for the transcription pipeline.
//!
//! These traits define the interfaces that concrete implementations must
//! satisfy, enabling pluggable backends and testability: the Gemini client
//! and the Notion client implement them in their own crates, and the
//! pipeline tests swap in mocks.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{CreatePageResult, VoiceNoteData};

// =============================================================================
// GENERATION BACKEND
// =============================================================================

/// Classification of a failed generation attempt.
///
/// Decided by the backend adapter from structured status information where
/// available; message substring heuristics apply only where the upstream
/// service exposes nothing structured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Expected to resolve against a different model; the fallback loop
    /// may continue.
    Transient,
    /// The attempt exceeded its time budget. Same fallback behavior as
    /// [`FailureKind::Transient`], reported distinctly.
    Timeout,
    /// Retrying another model would not help; the loop stops.
    Fatal,
}

/// A failed generation attempt with its classification.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct GenerationError {
    pub kind: FailureKind,
    pub message: String,
}

impl GenerationError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Transient,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Timeout,
            message: message.into(),
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Fatal,
            message: message.into(),
        }
    }

    /// Whether the fallback loop may try the next model after this failure.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind, FailureKind::Transient | FailureKind::Timeout)
    }
}

/// Backend that turns an audio buffer plus a prompt into generated text.
#[async_trait]
pub trait AudioGenerationBackend: Send + Sync {
    /// Run one generation attempt against a specific model.
    async fn generate_from_audio(
        &self,
        model: &str,
        audio: &[u8],
        mime_type: &str,
        prompt: &str,
    ) -> std::result::Result<String, GenerationError>;

    /// Backend identifier for logging.
    fn name(&self) -> &str;
}

// =============================================================================
// PAGE WRITER
// =============================================================================

/// Writer that persists a voice note as one page in the document store.
#[async_trait]
pub trait NotePageWriter: Send + Sync {
    /// Create one voice-note page.
    ///
    /// Never fails at the type level; failures are carried in the result
    /// value so callers can branch on an expected, recoverable outcome.
    async fn create_voice_note_page(&self, data: &VoiceNoteData) -> CreatePageResult;

    /// Check that the target database exists and is accessible.
    async fn validate_database(&self) -> bool;
}
