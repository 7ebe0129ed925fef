//! Gemini generation backend implementation.
//!
//! Speaks the Generative Language REST API: one `generateContent` call per
//! attempt, carrying the audio inline (base64) next to the text prompt.
//! Failures are classified at this boundary into the closed
//! [`FailureKind`] set the fallback loop branches on, decided from the HTTP
//! status where one is available and from message substrings otherwise.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use athan_core::{defaults, AudioGenerationBackend, Error, FailureKind, GenerationError, Result};

/// Default Gemini endpoint.
pub const DEFAULT_GEMINI_URL: &str = defaults::GEMINI_BASE_URL;

/// Timeout for generation requests (seconds).
pub const GEN_TIMEOUT_SECS: u64 = defaults::GEN_TIMEOUT_SECS;

/// Gemini inference backend.
pub struct GeminiBackend {
    client: Client,
    base_url: String,
    api_key: String,
    timeout_secs: u64,
}

impl GeminiBackend {
    /// Create a new Gemini backend with the default endpoint.
    pub fn new(api_key: String) -> Self {
        Self::with_config(DEFAULT_GEMINI_URL.to_string(), api_key)
    }

    /// Create a new Gemini backend with a custom endpoint.
    pub fn with_config(base_url: String, api_key: String) -> Self {
        let timeout_secs = std::env::var("ATHAN_GEN_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(GEN_TIMEOUT_SECS);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        info!("Initializing Gemini backend: url={}", base_url);

        Self {
            client,
            base_url,
            api_key,
            timeout_secs,
        }
    }

    /// Create from environment variables.
    ///
    /// A missing or empty `GEMINI_API_KEY` is a fatal configuration error.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(defaults::ENV_GEMINI_API_KEY)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                Error::Config("GEMINI_API_KEY is not defined in environment variables".to_string())
            })?;
        Ok(Self::new(api_key))
    }
}

// ---------------------------------------------------------------------------
// Error classification
// ---------------------------------------------------------------------------

/// Gemini-specific error classes, decided from the HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeminiErrorCode {
    /// Model not found or not available on this API version.
    ModelNotFound,
    /// Rate limit or quota exceeded.
    RateLimitExceeded,
    /// Server-side failure, including 503 "model overloaded".
    ServerError,
    /// Invalid authentication credentials.
    AuthenticationError,
    /// Malformed request.
    BadRequest,
    /// Unknown error.
    Unknown,
}

impl GeminiErrorCode {
    /// Determine the error code from an HTTP status.
    pub fn from_status(status: u16) -> Self {
        match status {
            404 => Self::ModelNotFound,
            429 => Self::RateLimitExceeded,
            500..=599 => Self::ServerError,
            401 | 403 => Self::AuthenticationError,
            400 => Self::BadRequest,
            _ => Self::Unknown,
        }
    }

    /// Check if the fallback loop may try the next model after this error.
    ///
    /// A missing model, a rate limit, and a server-side failure are all
    /// expected to resolve against a different backend model; auth and
    /// request-shape errors would fail identically everywhere.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ModelNotFound | Self::RateLimitExceeded | Self::ServerError
        )
    }
}

/// Classify an unstructured error message.
///
/// Last-resort substring heuristics for errors that arrive without an HTTP
/// status (transport failures, upstream proxies). Status-carrying errors
/// never reach this path.
pub fn classify_message(message: &str) -> FailureKind {
    let lower = message.to_lowercase();
    if lower.contains("timed out") || lower.contains("timeout") {
        return FailureKind::Timeout;
    }
    let transient = [
        "not found",
        "unavailable",
        "overloaded",
        "quota",
        "rate limit",
        "internal server error",
        "503",
        "429",
        "500",
    ];
    if transient.iter().any(|needle| lower.contains(needle)) {
        return FailureKind::Transient;
    }
    FailureKind::Fatal
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[async_trait]
impl AudioGenerationBackend for GeminiBackend {
    async fn generate_from_audio(
        &self,
        model: &str,
        audio: &[u8],
        mime_type: &str,
        prompt: &str,
    ) -> std::result::Result<String, GenerationError> {
        let start = Instant::now();

        let audio_b64 = base64::engine::general_purpose::STANDARD.encode(audio);
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        inline_data: Some(InlineData {
                            mime_type: mime_type.to_string(),
                            data: audio_b64,
                        }),
                        text: None,
                    },
                    Part {
                        inline_data: None,
                        text: Some(prompt.to_string()),
                    },
                ],
            }],
        };

        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .timeout(Duration::from_secs(self.timeout_secs))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::timeout(format!("Gemini request timed out: {}", e))
                } else {
                    let message = format!("Request failed: {}", e);
                    GenerationError {
                        kind: classify_message(&message),
                        message,
                    }
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let code = GeminiErrorCode::from_status(status.as_u16());
            let message = format!("Gemini returned {}: {}", status, body);
            warn!(model = model, status = %status, "Gemini generation failed");
            let kind = if code.is_retryable() {
                FailureKind::Transient
            } else {
                FailureKind::Fatal
            };
            return Err(GenerationError { kind, message });
        }

        let result: GenerateContentResponse = response.json().await.map_err(|e| {
            GenerationError::fatal(format!("Failed to parse Gemini response: {}", e))
        })?;

        let text: String = result
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(GenerationError::fatal(
                "Gemini returned an empty response".to_string(),
            ));
        }

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            model = model,
            response_len = text.len(),
            duration_ms = elapsed,
            "Generation complete"
        );
        if elapsed > 30000 {
            warn!(
                model = model,
                duration_ms = elapsed,
                audio_bytes = audio.len(),
                slow = true,
                "Slow generation operation"
            );
        }
        Ok(text)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_from_404() {
        let code = GeminiErrorCode::from_status(404);
        assert_eq!(code, GeminiErrorCode::ModelNotFound);
    }

    #[test]
    fn test_error_code_from_429() {
        let code = GeminiErrorCode::from_status(429);
        assert_eq!(code, GeminiErrorCode::RateLimitExceeded);
    }

    #[test]
    fn test_error_code_from_500_and_503() {
        assert_eq!(GeminiErrorCode::from_status(500), GeminiErrorCode::ServerError);
        assert_eq!(GeminiErrorCode::from_status(503), GeminiErrorCode::ServerError);
    }

    #[test]
    fn test_error_code_from_401() {
        let code = GeminiErrorCode::from_status(401);
        assert_eq!(code, GeminiErrorCode::AuthenticationError);
    }

    #[test]
    fn test_error_code_from_unknown() {
        let code = GeminiErrorCode::from_status(418);
        assert_eq!(code, GeminiErrorCode::Unknown);
    }

    #[test]
    fn test_retryable_codes() {
        assert!(GeminiErrorCode::ModelNotFound.is_retryable());
        assert!(GeminiErrorCode::RateLimitExceeded.is_retryable());
        assert!(GeminiErrorCode::ServerError.is_retryable());
    }

    #[test]
    fn test_not_retryable_codes() {
        assert!(!GeminiErrorCode::AuthenticationError.is_retryable());
        assert!(!GeminiErrorCode::BadRequest.is_retryable());
        assert!(!GeminiErrorCode::Unknown.is_retryable());
    }

    #[test]
    fn test_classify_message_timeout() {
        assert_eq!(
            classify_message("operation timed out after 60s"),
            FailureKind::Timeout
        );
    }

    #[test]
    fn test_classify_message_transient() {
        assert_eq!(
            classify_message("503 Service Unavailable"),
            FailureKind::Transient
        );
        assert_eq!(
            classify_message("The model is overloaded"),
            FailureKind::Transient
        );
        assert_eq!(
            classify_message("Resource quota exceeded"),
            FailureKind::Transient
        );
    }

    #[test]
    fn test_classify_message_fatal() {
        assert_eq!(
            classify_message("invalid argument: bad mime type"),
            FailureKind::Fatal
        );
    }

    #[test]
    fn test_request_serializes_inline_data_camel_case() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        inline_data: Some(InlineData {
                            mime_type: "audio/webm".to_string(),
                            data: "AAAA".to_string(),
                        }),
                        text: None,
                    },
                    Part {
                        inline_data: None,
                        text: Some("prompt".to_string()),
                    },
                ],
            }],
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["inlineData"]["mimeType"], "audio/webm");
        assert_eq!(json["contents"][0]["parts"][1]["text"], "prompt");
        assert!(json["contents"][0]["parts"][0].get("text").is_none());
    }

    #[test]
    fn test_response_deserializes_candidate_text() {
        let json = r#"{"candidates": [{"content": {"parts": [{"text": "hello"}]}}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let text = response.candidates[0]
            .content
            .as_ref()
            .unwrap()
            .parts[0]
            .text
            .as_deref();
        assert_eq!(text, Some("hello"));
    }
}
