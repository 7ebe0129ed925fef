//! Authentication HTTP handlers: login, logout, session check.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::{AppendHeaders, IntoResponse};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::auth::verify_credentials;
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    success: bool,
    message: String,
    username: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    is_logged_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
}

/// Rate-limit identifier: the client IP when a proxy forwards one,
/// otherwise the claimed username.
fn client_identifier(headers: &HeaderMap, username: &str) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .unwrap_or_else(|| username.to_string())
}

/// `POST /api/auth/login`
///
/// Authenticate and issue a session cookie. Attempts are counted against
/// the rate limiter before credentials are checked; a successful login
/// resets the counter so a legitimate user is not locked out by earlier
/// typos.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (username, password) = match (body.username, body.password) {
        (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u, p),
        _ => {
            return Err(ApiError::BadRequest(
                "Username and password are required".to_string(),
            ))
        }
    };

    let identifier = client_identifier(&headers, &username);
    let decision = state.rate_limiter.check(&identifier);
    if !decision.allowed {
        warn!(identifier = %identifier, "Login rate limit exceeded");
        return Err(ApiError::TooManyRequests(
            "Too many login attempts. Please try again later.".to_string(),
        ));
    }

    if !verify_credentials(&username, &password) {
        // Same message for a bad username and a bad password.
        return Err(ApiError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    state.rate_limiter.reset(&identifier);
    let cookie = state.sessions.issue_cookie(&username);
    info!(username = %username, "Login successful");

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(LoginResponse {
            success: true,
            message: "Login successful".to_string(),
            username,
        }),
    ))
}

/// `POST /api/auth/logout`
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        AppendHeaders([(SET_COOKIE, state.sessions.clear_cookie())]),
        Json(json!({ "success": true, "message": "Logged out" })),
    )
}

/// `GET /api/auth/check`
pub async fn check(State(state): State<AppState>, headers: HeaderMap) -> Json<CheckResponse> {
    match state.sessions.session_from_headers(&headers) {
        Some(session) => Json(CheckResponse {
            is_logged_in: true,
            username: Some(session.username),
        }),
        None => Json(CheckResponse {
            is_logged_in: false,
            username: None,
        }),
    }
}
