//! Centralized default constants for Athan Notes.
//!
//! **This module is the single source of truth** for all shared default
//! values. All crates reference these constants instead of defining their
//! own magic numbers.
//!
//! Organized by domain area. When adding new constants, place them in the
//! appropriate section and document the rationale for the chosen value.

// =============================================================================
// GEMINI
// =============================================================================

/// Base URL for the Gemini generative language API.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Ordered model fallback list. The pipeline tries each in sequence until
/// one succeeds; transient failures and timeouts advance to the next entry.
pub const GEMINI_MODELS: &[&str] = &[
    "gemini-2.0-flash-exp",
    "gemini-1.5-flash",
    "gemini-1.5-pro",
];

/// Timeout for a single model generation attempt (seconds).
pub const GEN_TIMEOUT_SECS: u64 = 60;

/// Environment variable overriding the model fallback list (comma-separated).
pub const ENV_GEMINI_MODELS: &str = "GEMINI_MODELS";

/// Environment variable holding the Gemini API key.
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";

// =============================================================================
// AUDIO UPLOADS
// =============================================================================

/// Maximum accepted audio upload size (50 MB).
pub const MAX_AUDIO_SIZE_BYTES: usize = 50 * 1024 * 1024;

/// MIME types accepted for audio uploads.
pub const ALLOWED_AUDIO_MIME_TYPES: &[&str] = &[
    "audio/webm",
    "audio/wav",
    "audio/mpeg",
    "audio/mp3",
    "audio/mp4",
    "audio/m4a",
    "audio/ogg",
    "audio/flac",
];

/// MIME type assumed when the upload does not declare one.
pub const DEFAULT_AUDIO_MIME_TYPE: &str = "audio/webm";

// =============================================================================
// NOTION
// =============================================================================

/// Base URL for the Notion REST API.
pub const NOTION_BASE_URL: &str = "https://api.notion.com";

/// Notion-Version header value sent with every request.
pub const NOTION_API_VERSION: &str = "2022-06-28";

/// Host prefix for browsable page URLs derived from page IDs.
pub const NOTION_PAGE_URL_PREFIX: &str = "https://notion.so/";

/// Notion's hard rich_text block limit is 2000 characters; content is
/// chunked at 1900 to leave a safety margin.
pub const NOTION_CHUNK_SIZE: usize = 1900;

/// Maximum characters kept in the Summary property (safer for Burmese text).
pub const SUMMARY_MAX_LEN: usize = 150;

/// Maximum characters kept in the title property.
pub const TITLE_MAX_LEN: usize = 100;

/// Maximum characters kept per tag (multi-select option name limit).
pub const TAG_MAX_LEN: usize = 100;

/// Environment variable holding the Notion integration token.
pub const ENV_NOTION_API_KEY: &str = "NOTION_API_KEY";

/// Environment variable holding the target database ID.
pub const ENV_NOTION_DATABASE_ID: &str = "NOTION_DATABASE_ID";

// =============================================================================
// NOTE SCHEMA
// =============================================================================

/// Maximum title length accepted from the model.
pub const SCHEMA_TITLE_MAX: usize = 100;

/// Maximum summary length accepted from the model.
pub const SCHEMA_SUMMARY_MAX: usize = 200;

/// Maximum number of tags accepted from the model.
pub const SCHEMA_TAGS_MAX: usize = 10;

// =============================================================================
// CATEGORIES
// =============================================================================

/// Category recorded when the incoming label is not a configured name.
pub const FALLBACK_CATEGORY: &str = "Personal";

/// Icon used for categories with no configured icon.
pub const DEFAULT_CATEGORY_ICON: &str = "📝";

/// User-customizable category config path, relative to the working directory.
pub const CATEGORIES_CONFIG_PATH: &str = "config/categories.json";

/// Fallback config shipped with the repository.
pub const CATEGORIES_EXAMPLE_PATH: &str = "config/categories.example.json";

// =============================================================================
// LOGIN RATE LIMITING
// =============================================================================

/// Login attempts allowed per identifier per window.
pub const LOGIN_MAX_ATTEMPTS: u32 = 5;

/// Login attempt window (seconds, 15 minutes).
pub const LOGIN_WINDOW_SECS: u64 = 15 * 60;

/// Interval between sweeps of expired rate-limit entries (seconds, 1 hour).
pub const LOGIN_SWEEP_INTERVAL_SECS: u64 = 60 * 60;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Maximum request body size in bytes. Sized for the audio ceiling plus
/// multipart framing overhead.
pub const MAX_BODY_SIZE_BYTES: usize = MAX_AUDIO_SIZE_BYTES + 1024 * 1024;

/// Default CORS max-age in seconds (1 hour).
pub const CORS_MAX_AGE_SECS: u64 = 3600;

// =============================================================================
// SESSION
// =============================================================================

/// Session cookie name.
pub const SESSION_COOKIE: &str = "athan_session";

/// Default session lifetime in seconds (4 days).
pub const SESSION_MAX_AGE_SECS: u64 = 345_600;

/// Environment variable holding the session signing secret.
pub const ENV_SESSION_SECRET: &str = "SESSION_SECRET";

/// Environment variable overriding the session lifetime.
pub const ENV_SESSION_MAX_AGE: &str = "SESSION_MAX_AGE";
