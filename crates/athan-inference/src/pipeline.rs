//! The audio-to-structured-note pipeline.
//!
//! Converts an audio buffer into a persisted, categorized note, tolerating
//! AI backend instability: an ordered list of Gemini models is tried in
//! sequence, each attempt bounded by a timeout, with transient failures
//! and timeouts falling through to the next model. The winning response is
//! parsed, schema-validated against the live category registry, and handed
//! to the page writer. Attempts are strictly sequential — racing models in
//! parallel would duplicate billable AI calls and Notion writes.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use athan_core::{
    defaults, AudioGenerationBackend, CategoryRegistry, Error, GenerationError, NotePageWriter,
    ProcessedNoteWithMetadata, Result, VoiceNoteData,
};

use crate::prompt::build_extraction_prompt;
use crate::schema::{parse_response, NoteSchema};

/// Validate an audio upload before it reaches the pipeline.
///
/// Rejects oversized files and MIME types outside the allow-list. An empty
/// MIME type is accepted; the HTTP layer substitutes the default before
/// calling in.
pub fn validate_audio_upload(size: usize, mime_type: &str) -> Result<()> {
    if size > defaults::MAX_AUDIO_SIZE_BYTES {
        return Err(Error::InvalidInput(format!(
            "Audio file too large. Maximum size is {}MB",
            defaults::MAX_AUDIO_SIZE_BYTES / 1024 / 1024
        )));
    }

    if !mime_type.is_empty()
        && !defaults::ALLOWED_AUDIO_MIME_TYPES.contains(&mime_type)
    {
        return Err(Error::InvalidInput(format!(
            "Unsupported audio format: {}. Allowed formats: {}",
            mime_type,
            defaults::ALLOWED_AUDIO_MIME_TYPES.join(", ")
        )));
    }

    Ok(())
}

/// Orchestrates one voice note from raw audio to a persisted Notion page.
pub struct TranscriptionPipeline {
    backend: Arc<dyn AudioGenerationBackend>,
    writer: Arc<dyn NotePageWriter>,
    registry: CategoryRegistry,
    models: Vec<String>,
    attempt_timeout: Duration,
}

impl TranscriptionPipeline {
    /// Create a pipeline with the default model list and attempt timeout.
    pub fn new(
        backend: Arc<dyn AudioGenerationBackend>,
        writer: Arc<dyn NotePageWriter>,
        registry: CategoryRegistry,
    ) -> Self {
        Self {
            backend,
            writer,
            registry,
            models: Self::models_from_env(),
            attempt_timeout: Duration::from_secs(defaults::GEN_TIMEOUT_SECS),
        }
    }

    /// Override the ordered model fallback list.
    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.models = models;
        self
    }

    /// Override the per-attempt timeout.
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Model fallback list: `GEMINI_MODELS` env var (comma-separated) or
    /// the built-in defaults.
    pub fn models_from_env() -> Vec<String> {
        match std::env::var(defaults::ENV_GEMINI_MODELS) {
            Ok(value) if !value.trim().is_empty() => value
                .split(',')
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect(),
            _ => defaults::GEMINI_MODELS
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }

    /// Process one audio buffer end to end.
    ///
    /// Every failure path converges to a single error whose message is one
    /// of: the schema-violation list, the JSON-parse failure, the wrapped
    /// Notion write failure, or the final model's raw error. Nothing is
    /// silently swallowed.
    pub async fn process(
        &self,
        audio: &[u8],
        mime_type: &str,
    ) -> Result<ProcessedNoteWithMetadata> {
        if self.models.is_empty() {
            return Err(Error::Config("no Gemini models configured".to_string()));
        }

        let prompt = build_extraction_prompt(&self.registry);
        let text = self.generate_with_fallback(audio, mime_type, &prompt).await?;

        let value = parse_response(&text)?;
        let schema = NoteSchema::new(self.registry.names());
        let note = schema
            .validate(&value)
            .map_err(|issues| Error::InvalidResponse(issues.join(", ")))?;

        let data = VoiceNoteData::from(note.clone());
        let result = self.writer.create_voice_note_page(&data).await;
        if !result.success {
            let message = result
                .error
                .unwrap_or_else(|| "Unknown error occurred".to_string());
            return Err(Error::Notion(format!("Failed to save note: {}", message)));
        }

        let category = result
            .category_mapped
            .unwrap_or_else(|| note.category.clone());
        let enriched = ProcessedNoteWithMetadata {
            category_icon: self.registry.icon(&category).to_string(),
            notion_url: result.page_url.unwrap_or_default(),
            note,
        };

        info!(
            category = %category,
            tags = enriched.note.tags.len(),
            "Voice note processed and saved"
        );
        Ok(enriched)
    }

    /// Sequential model fallback loop.
    ///
    /// Transient failures and timeouts advance to the next model; a fatal
    /// failure, or any failure on the last model, propagates as the final
    /// error. The first success terminates the loop.
    async fn generate_with_fallback(
        &self,
        audio: &[u8],
        mime_type: &str,
        prompt: &str,
    ) -> Result<String> {
        let last_index = self.models.len().saturating_sub(1);

        for (index, model) in self.models.iter().enumerate() {
            debug!(model = %model, attempt = index + 1, "Starting generation attempt");

            let attempt = self
                .backend
                .generate_from_audio(model, audio, mime_type, prompt);
            let failure = match tokio::time::timeout(self.attempt_timeout, attempt).await {
                Ok(Ok(text)) => {
                    debug!(model = %model, "Generation attempt succeeded");
                    return Ok(text);
                }
                Ok(Err(err)) => err,
                // The abandoned attempt is not cancelled at the network
                // level; the loop simply stops waiting for it.
                Err(_) => GenerationError::timeout(format!(
                    "Model {} timed out after {}s",
                    model,
                    self.attempt_timeout.as_secs()
                )),
            };

            if failure.is_retryable() && index < last_index {
                warn!(
                    model = %model,
                    kind = ?failure.kind,
                    error = %failure,
                    "Model attempt failed, falling back to next model"
                );
                continue;
            }

            return Err(Error::Inference(failure.message));
        }

        Err(Error::Config("no Gemini models configured".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockGenerationBackend, MockPageWriter};
    use athan_core::categories::CategoryConfig;

    fn test_registry() -> CategoryRegistry {
        CategoryRegistry::new(vec![
            CategoryConfig {
                name: "Project".to_string(),
                icon: "🚀".to_string(),
                description: "Business ideas, work projects".to_string(),
            },
            CategoryConfig {
                name: "Learning".to_string(),
                icon: "📚".to_string(),
                description: "Study notes, research".to_string(),
            },
            CategoryConfig {
                name: "Personal".to_string(),
                icon: "💭".to_string(),
                description: "Private thoughts, diary entries".to_string(),
            },
            CategoryConfig {
                name: "Task".to_string(),
                icon: "✅".to_string(),
                description: "To-dos, reminders".to_string(),
            },
        ])
        .unwrap()
    }

    fn valid_response() -> String {
        serde_json::json!({
            "title": "နေ့စဉ်မှတ်စု",
            "content": "ဒီနေ့ မနက်စောစောထပြီး စာအုပ်ဖတ်ခဲ့တယ်။",
            "summary": "စာဖတ်ခြင်းအကြောင်း။",
            "category": "Personal",
            "tags": ["diary", "reading", "morning"]
        })
        .to_string()
    }

    fn pipeline(
        backend: MockGenerationBackend,
        writer: MockPageWriter,
        models: &[&str],
    ) -> TranscriptionPipeline {
        TranscriptionPipeline::new(
            Arc::new(backend),
            Arc::new(writer),
            test_registry(),
        )
        .with_models(models.iter().map(|m| m.to_string()).collect())
    }

    #[tokio::test]
    async fn test_first_model_success_stops_loop() {
        let backend = MockGenerationBackend::new().with_success(valid_response());
        let pipe = pipeline(backend.clone(), MockPageWriter::new(), &["m1", "m2"]);

        let result = pipe.process(b"audio", "audio/webm").await.unwrap();
        assert_eq!(result.note.category, "Personal");
        assert_eq!(backend.calls(), vec!["m1"]);
    }

    #[tokio::test]
    async fn test_transient_failures_fall_back_to_third_model() {
        let backend = MockGenerationBackend::new()
            .with_failure(GenerationError::transient("503 Service Unavailable"))
            .with_failure(GenerationError::transient("503 Service Unavailable"))
            .with_success(valid_response());
        let pipe = pipeline(backend.clone(), MockPageWriter::new(), &["m1", "m2", "m3"]);

        let result = pipe.process(b"audio", "audio/webm").await.unwrap();
        assert_eq!(result.note.title, "နေ့စဉ်မှတ်စု");
        assert_eq!(backend.calls(), vec!["m1", "m2", "m3"]);
    }

    #[tokio::test]
    async fn test_transient_failure_on_last_model_propagates() {
        let backend = MockGenerationBackend::new()
            .with_failure(GenerationError::transient("503 Service Unavailable"))
            .with_failure(GenerationError::transient("model is overloaded"));
        let pipe = pipeline(backend.clone(), MockPageWriter::new(), &["m1", "m2"]);

        let err = pipe.process(b"audio", "audio/webm").await.unwrap_err();
        assert!(err.to_string().contains("model is overloaded"));
        assert_eq!(backend.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_fatal_failure_stops_loop_immediately() {
        let backend = MockGenerationBackend::new()
            .with_failure(GenerationError::fatal("invalid argument"))
            .with_success(valid_response());
        let pipe = pipeline(backend.clone(), MockPageWriter::new(), &["m1", "m2"]);

        let err = pipe.process(b"audio", "audio/webm").await.unwrap_err();
        assert!(err.to_string().contains("invalid argument"));
        assert_eq!(backend.calls(), vec!["m1"]);
    }

    #[tokio::test]
    async fn test_timeout_falls_back_to_next_model() {
        let backend = MockGenerationBackend::new()
            .with_hang(Duration::from_millis(500))
            .with_success(valid_response());
        let pipe = pipeline(backend.clone(), MockPageWriter::new(), &["m1", "m2"])
            .with_attempt_timeout(Duration::from_millis(50));

        let result = pipe.process(b"audio", "audio/webm").await.unwrap();
        assert_eq!(result.note.category, "Personal");
        assert_eq!(backend.calls(), vec!["m1", "m2"]);
    }

    #[tokio::test]
    async fn test_timeout_on_last_model_propagates() {
        let backend = MockGenerationBackend::new().with_hang(Duration::from_millis(500));
        let pipe = pipeline(backend.clone(), MockPageWriter::new(), &["m1"])
            .with_attempt_timeout(Duration::from_millis(50));

        let err = pipe.process(b"audio", "audio/webm").await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_unparseable_response_is_invalid_json_error() {
        let backend =
            MockGenerationBackend::new().with_success("I could not transcribe the audio.");
        let pipe = pipeline(backend, MockPageWriter::new(), &["m1", "m2"]);

        let err = pipe.process(b"audio", "audio/webm").await.unwrap_err();
        assert!(err.to_string().contains("invalid JSON response"));
    }

    #[tokio::test]
    async fn test_fenced_response_is_accepted() {
        let backend = MockGenerationBackend::new()
            .with_success(format!("```json\n{}\n```", valid_response()));
        let pipe = pipeline(backend, MockPageWriter::new(), &["m1"]);

        let result = pipe.process(b"audio", "audio/webm").await.unwrap();
        assert_eq!(result.note.category, "Personal");
    }

    #[tokio::test]
    async fn test_schema_violation_is_not_retried() {
        let bad = serde_json::json!({
            "title": "t",
            "content": "c",
            "summary": "s",
            "category": "Diary",
            "tags": ["x"]
        })
        .to_string();
        let backend = MockGenerationBackend::new()
            .with_success(bad)
            .with_success(valid_response());
        let pipe = pipeline(backend.clone(), MockPageWriter::new(), &["m1", "m2"]);

        let err = pipe.process(b"audio", "audio/webm").await.unwrap_err();
        assert!(err.to_string().contains("Invalid response format"));
        assert!(err.to_string().contains("category"));
        // A response-shape error is not a request failure; no second model.
        assert_eq!(backend.calls(), vec!["m1"]);
    }

    #[tokio::test]
    async fn test_writer_failure_is_wrapped_error() {
        let backend = MockGenerationBackend::new().with_success(valid_response());
        let writer = MockPageWriter::new().with_failure("database not shared");
        let pipe = pipeline(backend, writer, &["m1"]);

        let err = pipe.process(b"audio", "audio/webm").await.unwrap_err();
        assert!(err.to_string().contains("Failed to save note"));
        assert!(err.to_string().contains("database not shared"));
    }

    #[tokio::test]
    async fn test_success_enriches_with_icon_and_url() {
        let backend = MockGenerationBackend::new().with_success(valid_response());
        let writer = MockPageWriter::new().with_page_id("1234-abcd-5678");
        let pipe = pipeline(backend, writer.clone(), &["m1"]);

        let result = pipe.process(b"audio", "audio/webm").await.unwrap();
        assert_eq!(result.category_icon, "💭");
        assert_eq!(result.notion_url, "https://notion.so/1234abcd5678");
        assert_eq!(writer.pages().len(), 1);
        assert_eq!(writer.pages()[0].category, "Personal");
    }

    #[tokio::test]
    async fn test_empty_model_list_is_config_error() {
        let backend = MockGenerationBackend::new().with_success(valid_response());
        let pipe = pipeline(backend, MockPageWriter::new(), &[]);

        let err = pipe.process(b"audio", "audio/webm").await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    // ------------------------------------------------------------------
    // validate_audio_upload
    // ------------------------------------------------------------------

    #[test]
    fn test_validate_audio_upload_accepts_allowed_types() {
        assert!(validate_audio_upload(1024, "audio/webm").is_ok());
        assert!(validate_audio_upload(1024, "audio/flac").is_ok());
        assert!(validate_audio_upload(1024, "").is_ok());
    }

    #[test]
    fn test_validate_audio_upload_rejects_unknown_type() {
        let err = validate_audio_upload(1024, "video/mp4").unwrap_err();
        assert!(err.to_string().contains("Unsupported audio format"));
        assert!(err.to_string().contains("video/mp4"));
    }

    #[test]
    fn test_validate_audio_upload_rejects_oversized() {
        let err =
            validate_audio_upload(defaults::MAX_AUDIO_SIZE_BYTES + 1, "audio/webm").unwrap_err();
        assert!(err.to_string().contains("too large"));
        assert!(err.to_string().contains("50MB"));
    }

    #[test]
    fn test_validate_audio_upload_at_limit_passes() {
        assert!(validate_audio_upload(defaults::MAX_AUDIO_SIZE_BYTES, "audio/wav").is_ok());
    }
}
