use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// A credential accepted by the auth gate.
///
/// Only the SHA-256 digest of the raw key is kept. `permissions` is carried
/// for display and is not enforced anywhere.
#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyInfo {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub key_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub permissions: Vec<String>,
}

impl ApiKeyInfo {
    /// Creates an active record for `secret`
    pub fn from_secret(id: impl Into<String>, name: impl Into<String>, secret: &str) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            key_hash: sha256_hex(secret),
            created_at: Utc::now(),
            last_used_at: None,
            is_active: true,
            permissions: Vec::new(),
        }
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    /// Returns true when the key is active and `candidate` hashes to `key_hash`.
    ///
    /// The digest of the candidate is always computed and compared, even for
    /// inactive keys, so the work done does not depend on the outcome.
    pub fn matches(&self, candidate: &str) -> bool {
        self.matches_bytes(candidate.as_bytes())
    }

    /// Same as [`ApiKeyInfo::matches`] for raw header bytes, which need not be ASCII
    pub fn matches_bytes(&self, candidate: &[u8]) -> bool {
        let digest_matches = constant_time_eq(&sha256_hex(candidate), &self.key_hash);
        digest_matches && self.is_active
    }

    /// Permanently disables the key. There is no way back
    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    pub fn record_use(&mut self, at: DateTime<Utc>) {
        self.last_used_at = Some(at);
    }
}

/// SHA-256 hash of `input`, hex-encoded
pub fn sha256_hex(input: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(input.as_ref()))
}

/// Constant-time comparison of two strings of equal length.
///
/// Callers compare fixed-length digests, so the length check never leaks
/// anything about the secret itself.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes()
        .iter()
        .zip(b.as_bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_hex_known_vector() {
        assert_eq!(
            sha256_hex("hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn constant_time_eq_behaviour() {
        assert!(constant_time_eq("hello", "hello"));
        assert!(!constant_time_eq("hello", "world"));
        assert!(!constant_time_eq("short", "longer-string"));
        assert!(constant_time_eq("", ""));
    }

    #[test]
    fn record_never_stores_raw_secret() {
        let key = ApiKeyInfo::from_secret("k1", "default", "S3cr3t");
        assert_ne!(key.key_hash, "S3cr3t");
        assert_eq!(key.key_hash.len(), 64);
        let json = serde_json::to_value(&key).unwrap();
        assert!(json.get("key_hash").is_none());
    }

    #[test]
    fn matches_is_exact_and_case_sensitive() {
        let key = ApiKeyInfo::from_secret("k1", "default", "S3cr3t");
        assert!(key.matches("S3cr3t"));
        assert!(!key.matches("s3cr3t"));
        assert!(!key.matches("S3cr3t "));
        assert!(!key.matches(""));
    }

    #[test]
    fn non_ascii_secret_matches_its_utf8_bytes() {
        let key = ApiKeyInfo::from_secret("k1", "default", "pässwört-S3cr3t");
        assert!(key.matches("pässwört-S3cr3t"));
        assert!(key.matches_bytes("pässwört-S3cr3t".as_bytes()));
        assert!(!key.matches_bytes(b"passwort-S3cr3t"));
    }

    #[test]
    fn deactivated_key_never_matches() {
        let mut key = ApiKeyInfo::from_secret("k1", "default", "S3cr3t");
        key.deactivate();
        assert!(!key.is_active);
        assert!(!key.matches("S3cr3t"));
    }

    #[test]
    fn permissions_and_usage_are_recorded() {
        let mut key = ApiKeyInfo::from_secret("k1", "default", "S3cr3t")
            .with_permissions(["tools:read", "tools:call"]);
        assert_eq!(key.permissions, vec!["tools:read", "tools:call"]);
        assert!(key.last_used_at.is_none());

        let now = Utc::now();
        key.record_use(now);
        assert_eq!(key.last_used_at, Some(now));
    }
}
