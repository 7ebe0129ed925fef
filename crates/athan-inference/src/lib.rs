//! # athan-inference
//!
//! Gemini inference backend and the audio-to-structured-note pipeline for
//! Athan Notes.
//!
//! This crate provides:
//! - The Gemini generation backend (inline audio + prompt → text)
//! - Failure classification for the model fallback loop
//! - Structured-extraction prompt construction from the category registry
//! - Response schema validation for the model's JSON output
//! - The transcription pipeline orchestrating all of the above
//! - Mock backends for deterministic testing (feature `mock`)

pub mod gemini;
pub mod pipeline;
pub mod prompt;
pub mod schema;

// Mock backends for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use athan_core::*;

pub use gemini::GeminiBackend;
pub use pipeline::{validate_audio_upload, TranscriptionPipeline};
pub use prompt::build_extraction_prompt;
pub use schema::NoteSchema;
