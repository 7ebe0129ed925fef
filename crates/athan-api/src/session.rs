//! HMAC-signed cookie sessions.
//!
//! Single-user sessions carried entirely in a signed cookie: a base64 JSON
//! payload (`username`, `logged_in_at`) joined with an HMAC-SHA256
//! signature over it. Tampered, malformed, or expired cookies all read as
//! logged-out; verification is constant-time via the `hmac` crate.

use std::time::Duration;

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::warn;

use athan_core::{defaults, Error, Result};

type HmacSha256 = Hmac<Sha256>;

const B64: base64::engine::GeneralPurpose = base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Authenticated session payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub username: String,
    /// Unix timestamp (seconds) of login.
    pub logged_in_at: i64,
}

/// Issues and verifies session cookies.
pub struct SessionManager {
    secret: String,
    max_age: Duration,
    secure: bool,
}

impl SessionManager {
    pub fn new(secret: String, max_age: Duration, secure: bool) -> Self {
        Self {
            secret,
            max_age,
            secure,
        }
    }

    /// Create from environment variables.
    ///
    /// `SESSION_SECRET` is required and must be at least 32 characters;
    /// anything shorter is a fatal configuration error. `SESSION_MAX_AGE`
    /// overrides the default 4-day lifetime. The Secure cookie attribute
    /// is applied when `APP_ENV=production`.
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var(defaults::ENV_SESSION_SECRET).map_err(|_| {
            Error::Config("SESSION_SECRET is not defined in environment variables".to_string())
        })?;
        if secret.len() < 32 {
            return Err(Error::Config(
                "SESSION_SECRET must be at least 32 characters".to_string(),
            ));
        }

        let max_age_secs = std::env::var(defaults::ENV_SESSION_MAX_AGE)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults::SESSION_MAX_AGE_SECS);

        let secure = std::env::var("APP_ENV")
            .map(|v| v == "production")
            .unwrap_or(false);

        Ok(Self::new(secret, Duration::from_secs(max_age_secs), secure))
    }

    fn sign(&self, payload_b64: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(payload_b64.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Signed cookie value for a fresh session.
    pub fn issue(&self, username: &str) -> String {
        let data = SessionData {
            username: username.to_string(),
            logged_in_at: chrono::Utc::now().timestamp(),
        };
        let payload = B64.encode(serde_json::to_vec(&data).expect("session data serializes"));
        let signature = self.sign(&payload);
        format!("{}.{}", payload, signature)
    }

    /// Full Set-Cookie header value for a fresh session.
    pub fn issue_cookie(&self, username: &str) -> String {
        format!(
            "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}{}",
            defaults::SESSION_COOKIE,
            self.issue(username),
            self.max_age.as_secs(),
            if self.secure { "; Secure" } else { "" }
        )
    }

    /// Set-Cookie header value that clears the session.
    pub fn clear_cookie(&self) -> String {
        format!(
            "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0{}",
            defaults::SESSION_COOKIE,
            if self.secure { "; Secure" } else { "" }
        )
    }

    /// Verify a cookie value, returning the session when the signature
    /// checks out and the session has not expired.
    pub fn verify(&self, cookie_value: &str) -> Option<SessionData> {
        let (payload, signature) = cookie_value.split_once('.')?;

        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(payload.as_bytes());
        let signature_bytes = hex::decode(signature).ok()?;
        if mac.verify_slice(&signature_bytes).is_err() {
            warn!("Session cookie signature mismatch");
            return None;
        }

        let data: SessionData = serde_json::from_slice(&B64.decode(payload).ok()?).ok()?;

        let expires_at = data.logged_in_at + self.max_age.as_secs() as i64;
        if chrono::Utc::now().timestamp() >= expires_at {
            return None;
        }

        Some(data)
    }

    /// Extract and verify the session from request headers.
    pub fn session_from_headers(&self, headers: &HeaderMap) -> Option<SessionData> {
        let cookies = headers.get(COOKIE)?.to_str().ok()?;
        let prefix = format!("{}=", defaults::SESSION_COOKIE);
        let value = cookies
            .split(';')
            .map(str::trim)
            .find_map(|c| c.strip_prefix(prefix.as_str()))?;
        self.verify(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn manager() -> SessionManager {
        SessionManager::new(
            "a-test-secret-that-is-long-enough-000".to_string(),
            Duration::from_secs(3600),
            false,
        )
    }

    #[test]
    fn test_issue_then_verify_roundtrip() {
        let sessions = manager();
        let cookie = sessions.issue("athan");
        let data = sessions.verify(&cookie).unwrap();
        assert_eq!(data.username, "athan");
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let sessions = manager();
        let cookie = sessions.issue("athan");
        let (_, signature) = cookie.split_once('.').unwrap();
        let forged_payload = B64.encode(
            serde_json::to_vec(&SessionData {
                username: "admin".to_string(),
                logged_in_at: chrono::Utc::now().timestamp(),
            })
            .unwrap(),
        );
        let forged = format!("{}.{}", forged_payload, signature);
        assert!(sessions.verify(&forged).is_none());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let sessions = manager();
        let cookie = sessions.issue("athan");

        let other = SessionManager::new(
            "a-different-secret-that-is-long-enough".to_string(),
            Duration::from_secs(3600),
            false,
        );
        assert!(other.verify(&cookie).is_none());
    }

    #[test]
    fn test_garbage_cookie_is_rejected() {
        let sessions = manager();
        assert!(sessions.verify("not-a-session").is_none());
        assert!(sessions.verify("payload.nothex").is_none());
        assert!(sessions.verify("").is_none());
    }

    #[test]
    fn test_expired_session_is_rejected() {
        let sessions = SessionManager::new(
            "a-test-secret-that-is-long-enough-000".to_string(),
            Duration::from_secs(0),
            false,
        );
        let cookie = sessions.issue("athan");
        assert!(sessions.verify(&cookie).is_none());
    }

    #[test]
    fn test_session_from_headers_parses_cookie_list() {
        let sessions = manager();
        let cookie = sessions.issue("athan");

        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("theme=dark; athan_session={}; lang=my", cookie))
                .unwrap(),
        );

        let data = sessions.session_from_headers(&headers).unwrap();
        assert_eq!(data.username, "athan");
    }

    #[test]
    fn test_session_from_headers_missing_cookie() {
        let sessions = manager();
        let headers = HeaderMap::new();
        assert!(sessions.session_from_headers(&headers).is_none());
    }

    #[test]
    fn test_issue_cookie_sets_attributes() {
        let sessions = manager();
        let cookie = sessions.issue_cookie("athan");
        assert!(cookie.starts_with("athan_session="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_secure_attribute_in_production_mode() {
        let sessions = SessionManager::new(
            "a-test-secret-that-is-long-enough-000".to_string(),
            Duration::from_secs(3600),
            true,
        );
        assert!(sessions.issue_cookie("athan").contains("; Secure"));
        assert!(sessions.clear_cookie().contains("; Secure"));
    }

    #[test]
    fn test_clear_cookie_zeroes_max_age() {
        let sessions = manager();
        let cookie = sessions.clear_cookie();
        assert!(cookie.starts_with("athan_session=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
