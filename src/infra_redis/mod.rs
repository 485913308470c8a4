mod refresh_token_store_redis;
mod token_blacklist_redis;

pub use refresh_token_store_redis::*;
pub use token_blacklist_redis::*;

use crate::application_port::AuthError;
use redis::RedisResult;
use std::future::Future;
use std::time::Duration;

/// Bound every store round-trip. A timed-out write may or may not have
/// landed; reporting it as a store failure (never as success) is what keeps
/// the single-slot invariant honest.
pub(crate) async fn bounded<T>(
    op: &str,
    limit: Duration,
    fut: impl Future<Output = RedisResult<T>>,
) -> Result<T, AuthError> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(|e| AuthError::Store(format!("{op}: {e}"))),
        Err(_) => Err(AuthError::Store(format!("{op}: timed out"))),
    }
}
