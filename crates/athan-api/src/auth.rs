//! Credential verification against environment configuration.
//!
//! Single-user deployment: the one valid username and a bcrypt hash of the
//! password live in `APP_USERNAME` / `APP_PASSWORD_HASH`. Backslashes are
//! stripped from the hash to tolerate env files that escape `$`.

use tracing::error;

/// Verify a username/password pair against the configured credentials.
pub fn verify_credentials(username: &str, password: &str) -> bool {
    let env_username = std::env::var("APP_USERNAME").ok();
    let env_hash = std::env::var("APP_PASSWORD_HASH")
        .ok()
        .map(|h| h.replace('\\', ""));

    match (env_username, env_hash) {
        (Some(expected_username), Some(password_hash)) => {
            verify_against(username, password, &expected_username, &password_hash)
        }
        _ => {
            error!("Authentication environment variables not configured");
            false
        }
    }
}

/// Pure comparison against explicit expected values.
fn verify_against(
    username: &str,
    password: &str,
    expected_username: &str,
    password_hash: &str,
) -> bool {
    if username != expected_username {
        return false;
    }

    match bcrypt::verify(password, password_hash) {
        Ok(valid) => valid,
        Err(e) => {
            error!(error = %e, "Error verifying password hash");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash(password: &str) -> String {
        // Minimum cost keeps the test fast; production hashes use the
        // bcrypt default.
        bcrypt::hash(password, 4).unwrap()
    }

    #[test]
    fn test_correct_credentials_pass() {
        let password_hash = hash("hunter2");
        assert!(verify_against("athan", "hunter2", "athan", &password_hash));
    }

    #[test]
    fn test_wrong_password_fails() {
        let password_hash = hash("hunter2");
        assert!(!verify_against("athan", "wrong", "athan", &password_hash));
    }

    #[test]
    fn test_wrong_username_fails() {
        let password_hash = hash("hunter2");
        assert!(!verify_against("someone", "hunter2", "athan", &password_hash));
    }

    #[test]
    fn test_malformed_hash_fails_closed() {
        assert!(!verify_against("athan", "hunter2", "athan", "not-a-bcrypt-hash"));
    }

    #[test]
    fn test_escaped_hash_characters_are_stripped() {
        // ".env" files often escape "$" with a backslash; the stripped
        // form must still verify.
        let escaped = hash("hunter2").replace('$', "\\$");
        let stripped = escaped.replace('\\', "");
        assert!(verify_against("athan", "hunter2", "athan", &stripped));
    }
}
