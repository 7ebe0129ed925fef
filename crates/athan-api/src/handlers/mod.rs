//! HTTP handlers for the Athan Notes API.

pub mod audio;
pub mod auth;
pub mod notion;

use axum::http::HeaderMap;

use crate::session::SessionData;
use crate::{ApiError, AppState};

/// Extract the authenticated session or fail with 401.
pub fn require_session(state: &AppState, headers: &HeaderMap) -> Result<SessionData, ApiError> {
    state
        .sessions
        .session_from_headers(headers)
        .ok_or_else(|| ApiError::Unauthorized("Unauthorized. Please login first.".to_string()))
}
