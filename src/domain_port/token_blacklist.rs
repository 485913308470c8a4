use crate::application_port::AuthError;
use std::time::Duration;

/// Revoked access-token identifiers. Each entry lives exactly as long as the
/// token it blocks, so nothing ever needs explicit cleanup.
#[async_trait::async_trait]
pub trait TokenBlacklist: Send + Sync {
    /// No-op when `remaining` is zero: an expired token needs no entry.
    async fn add(&self, jti: &str, remaining: Duration) -> Result<(), AuthError>;

    async fn is_blacklisted(&self, jti: &str) -> Result<bool, AuthError>;
}
