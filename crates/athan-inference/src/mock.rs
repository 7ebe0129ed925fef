//! Mock backends for deterministic pipeline testing.
//!
//! `MockGenerationBackend` plays back a scripted sequence of outcomes (one
//! per generation attempt, in order) and records which models were tried.
//! `MockPageWriter` records every page it is asked to create and can be
//! switched into a failing mode.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use athan_core::{
    AudioGenerationBackend, CreatePageResult, GenerationError, NotePageWriter, VoiceNoteData,
};

/// One scripted outcome for a generation attempt.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Return this text.
    Success(String),
    /// Fail with this classified error.
    Failure(GenerationError),
    /// Sleep for this long, then fail. Lets pipeline-level timeouts fire
    /// first in tests.
    Hang(Duration),
}

/// Scripted generation backend.
#[derive(Clone, Default)]
pub struct MockGenerationBackend {
    script: Arc<Mutex<VecDeque<MockOutcome>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockGenerationBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a successful attempt returning `text`.
    pub fn with_success(self, text: impl Into<String>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(MockOutcome::Success(text.into()));
        self
    }

    /// Append a failing attempt.
    pub fn with_failure(self, error: GenerationError) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(MockOutcome::Failure(error));
        self
    }

    /// Append an attempt that hangs for `duration` before failing.
    pub fn with_hang(self, duration: Duration) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(MockOutcome::Hang(duration));
        self
    }

    /// Models tried so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AudioGenerationBackend for MockGenerationBackend {
    async fn generate_from_audio(
        &self,
        model: &str,
        _audio: &[u8],
        _mime_type: &str,
        _prompt: &str,
    ) -> std::result::Result<String, GenerationError> {
        self.calls.lock().unwrap().push(model.to_string());

        let outcome = self.script.lock().unwrap().pop_front();
        match outcome {
            Some(MockOutcome::Success(text)) => Ok(text),
            Some(MockOutcome::Failure(error)) => Err(error),
            Some(MockOutcome::Hang(duration)) => {
                tokio::time::sleep(duration).await;
                Err(GenerationError::fatal("hang elapsed without timeout"))
            }
            None => Err(GenerationError::fatal("mock script exhausted")),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Recording page writer.
#[derive(Clone)]
pub struct MockPageWriter {
    pages: Arc<Mutex<Vec<VoiceNoteData>>>,
    fail_with: Option<String>,
    page_id: String,
}

impl MockPageWriter {
    pub fn new() -> Self {
        Self {
            pages: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
            page_id: "0000-mock-page".to_string(),
        }
    }

    /// Fail every page creation with this message.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.fail_with = Some(message.into());
        self
    }

    /// Use this page ID for created pages.
    pub fn with_page_id(mut self, page_id: impl Into<String>) -> Self {
        self.page_id = page_id.into();
        self
    }

    /// Pages created so far, in call order.
    pub fn pages(&self) -> Vec<VoiceNoteData> {
        self.pages.lock().unwrap().clone()
    }
}

impl Default for MockPageWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotePageWriter for MockPageWriter {
    async fn create_voice_note_page(&self, data: &VoiceNoteData) -> CreatePageResult {
        self.pages.lock().unwrap().push(data.clone());

        match &self.fail_with {
            Some(message) => CreatePageResult::failure(message.clone()),
            None => CreatePageResult::created(
                self.page_id.clone(),
                format!("https://notion.so/{}", self.page_id.replace('-', "")),
                data.category.clone(),
            ),
        }
    }

    async fn validate_database(&self) -> bool {
        self.fail_with.is_none()
    }
}
