//! # athan-core
//!
//! Core types, traits, and abstractions for Athan Notes.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the other Athan Notes crates depend on: the shared error type, the
//! category registry, text segmentation utilities sized for the Notion API,
//! and the backend trait seams used by the transcription pipeline.

pub mod categories;
pub mod defaults;
pub mod error;
pub mod models;
pub mod segment;
pub mod traits;

// Re-export commonly used types at crate root
pub use categories::{Category, CategoryConfig, CategoryRegistry};
pub use error::{Error, Result};
pub use models::{CreatePageResult, ProcessedNote, ProcessedNoteWithMetadata, VoiceNoteData};
pub use segment::{chunk_content, truncate_summary, truncate_text};
pub use traits::{AudioGenerationBackend, FailureKind, GenerationError, NotePageWriter};
