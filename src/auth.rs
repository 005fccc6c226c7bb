/**
 * Authentication Gate
 * Every protected operation presents a single process-wide shared secret in
 * the Authorization header, either bare or prefixed with "Bearer ".
 */
use axum::http::{header, HeaderMap};

use crate::error::ApiError;
use crate::AppState;

/// Credential check behind the admin-only operations. The trait keeps the
/// call sites agnostic so per-user tokens can replace the shared secret
/// without touching handlers.
pub trait CredentialValidator: Send + Sync {
    fn validate(&self, header: Option<&str>) -> bool;
}

/// Shared-secret validator. This trust model is deliberately weak (one
/// static secret distributed to the admin client); it is preserved for
/// compatibility with the existing frontend, not as a pattern to copy.
pub struct StaticSecret {
    secret: String,
}

impl StaticSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl CredentialValidator for StaticSecret {
    fn validate(&self, header: Option<&str>) -> bool {
        let Some(value) = header else {
            return false;
        };
        let token = value.strip_prefix("Bearer ").unwrap_or(value);
        token == self.secret
    }
}

pub fn authorization_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
}

/// Rejects with 401 before any data-store access happens.
pub fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    if state.auth.validate(authorization_header(headers)) {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_secret_is_accepted() {
        let validator = StaticSecret::new("s3cret");
        assert!(validator.validate(Some("s3cret")));
    }

    #[test]
    fn test_bearer_prefixed_secret_is_accepted() {
        let validator = StaticSecret::new("s3cret");
        assert!(validator.validate(Some("Bearer s3cret")));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let validator = StaticSecret::new("s3cret");
        assert!(!validator.validate(Some("nope")));
        assert!(!validator.validate(Some("Bearer nope")));
    }

    #[test]
    fn test_missing_header_is_rejected() {
        let validator = StaticSecret::new("s3cret");
        assert!(!validator.validate(None));
        assert!(!validator.validate(Some("")));
    }

    #[test]
    fn test_prefix_match_is_case_sensitive() {
        let validator = StaticSecret::new("s3cret");
        assert!(!validator.validate(Some("bearer s3cret")));
    }
}
