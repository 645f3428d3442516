use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api_key::ApiKeyInfo;
use crate::constants::{API_KEY_HEADER, DEFAULT_PROTECTED_PATH};
use crate::error::AuthError;

/// Immutable gate configuration: one accepted key and the prefixes it guards
#[derive(Debug, Clone)]
pub struct ApiKeyAuth {
    key: ApiKeyInfo,
    protected_paths: Vec<String>,
}

impl ApiKeyAuth {
    /// Gate accepting `secret`, protecting `/mcp` only
    pub fn new(secret: &str) -> Self {
        Self::from_key(ApiKeyInfo::from_secret("default", "server", secret))
    }

    pub fn from_key(key: ApiKeyInfo) -> Self {
        Self {
            key,
            protected_paths: vec![DEFAULT_PROTECTED_PATH.to_string()],
        }
    }

    pub fn with_protected_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.protected_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn protected_paths(&self) -> &[String] {
        &self.protected_paths
    }

    /// Whether `path` falls under one of the protected prefixes
    pub fn requires_auth(&self, path: &str) -> bool {
        self.protected_paths
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Validates the `X-API-Key` header against the configured key
    pub fn verify(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let value = headers.get(API_KEY_HEADER).ok_or(AuthError::MissingKey)?;

        if self.key.matches_bytes(value.as_bytes()) {
            Ok(())
        } else {
            Err(AuthError::InvalidKey)
        }
    }
}

/// Axum middleware enforcing [`ApiKeyAuth`] on protected paths.
///
/// Install with `axum::middleware::from_fn_with_state(Arc<ApiKeyAuth>, api_key_middleware)`.
pub async fn api_key_middleware(
    State(auth): State<Arc<ApiKeyAuth>>,
    request: Request,
    next: Next,
) -> Response {
    if !auth.requires_auth(request.uri().path()) {
        return next.run(request).await;
    }

    match auth.verify(request.headers()) {
        Ok(()) => next.run(request).await,
        Err(err) => {
            tracing::warn!(
                path = %request.uri().path(),
                reason = %err,
                "Rejected unauthenticated request"
            );
            err.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(name: &str, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_str(value).unwrap(),
        );
        headers
    }

    #[test]
    fn default_gate_protects_mcp_prefix() {
        let auth = ApiKeyAuth::new("S3cr3t");
        assert!(auth.requires_auth("/mcp"));
        assert!(auth.requires_auth("/mcp/session"));
        assert!(!auth.requires_auth("/health"));
        assert!(!auth.requires_auth("/"));
    }

    #[test]
    fn custom_prefixes_replace_default() {
        let auth = ApiKeyAuth::new("S3cr3t").with_protected_paths(["/admin", "/tools"]);
        assert!(auth.requires_auth("/admin/keys"));
        assert!(auth.requires_auth("/tools"));
        assert!(!auth.requires_auth("/mcp"));
    }

    #[test]
    fn verify_missing_header() {
        let auth = ApiKeyAuth::new("S3cr3t");
        assert_eq!(auth.verify(&HeaderMap::new()), Err(AuthError::MissingKey));
    }

    #[test]
    fn verify_header_name_is_case_insensitive() {
        let auth = ApiKeyAuth::new("S3cr3t");
        assert_eq!(auth.verify(&headers_with("X-API-KEY", "S3cr3t")), Ok(()));
        assert_eq!(auth.verify(&headers_with("x-api-key", "S3cr3t")), Ok(()));
    }

    #[test]
    fn verify_value_is_case_sensitive() {
        let auth = ApiKeyAuth::new("S3cr3t");
        assert_eq!(
            auth.verify(&headers_with("X-API-Key", "s3cr3t")),
            Err(AuthError::InvalidKey)
        );
        assert_eq!(
            auth.verify(&headers_with("X-API-Key", "")),
            Err(AuthError::InvalidKey)
        );
    }

    #[test]
    fn verify_rejects_trailing_non_utf8_bytes() {
        let auth = ApiKeyAuth::new("S3cr3t");
        let mut headers = HeaderMap::new();
        headers.insert(
            API_KEY_HEADER,
            HeaderValue::from_bytes(b"S3cr3t\xff").unwrap(),
        );
        assert_eq!(auth.verify(&headers), Err(AuthError::InvalidKey));
    }

    #[test]
    fn verify_accepts_non_ascii_secret() {
        let auth = ApiKeyAuth::new("pässwört-S3cr3t");
        assert_eq!(
            auth.verify(&headers_with("X-API-Key", "pässwört-S3cr3t")),
            Ok(())
        );
        assert_eq!(
            auth.verify(&headers_with("X-API-Key", "passwort-S3cr3t")),
            Err(AuthError::InvalidKey)
        );
    }

    #[test]
    fn deactivated_key_is_rejected() {
        let mut key = ApiKeyInfo::from_secret("k1", "rotated", "S3cr3t");
        key.deactivate();
        let auth = ApiKeyAuth::from_key(key);
        assert_eq!(
            auth.verify(&headers_with("X-API-Key", "S3cr3t")),
            Err(AuthError::InvalidKey)
        );
    }
}
