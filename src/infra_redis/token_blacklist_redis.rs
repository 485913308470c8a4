use super::bounded;
use crate::application_port::AuthError;
use crate::domain_port::TokenBlacklist;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::time::Duration;

/// Value is a marker only; the key's TTL carries all the meaning.
const REVOKED_MARKER: &str = "logout";

pub struct RedisTokenBlacklist {
    conn: ConnectionManager,
    prefix: String,
    op_timeout: Duration,
}

fn entry_key(prefix: &str, jti: &str) -> String {
    format!("{}:{}", prefix, jti)
}

impl RedisTokenBlacklist {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>, op_timeout: Duration) -> Self {
        RedisTokenBlacklist {
            conn,
            prefix: prefix.into(),
            op_timeout,
        }
    }
}

#[async_trait::async_trait]
impl TokenBlacklist for RedisTokenBlacklist {
    async fn add(&self, jti: &str, remaining: Duration) -> Result<(), AuthError> {
        // `SET ... EX 0` is a redis error, and a token with nothing left to
        // live needs no entry at all.
        let secs = remaining.as_secs();
        if secs == 0 {
            return Ok(());
        }
        let key = entry_key(&self.prefix, jti);
        let mut conn = self.conn.clone();
        let _: () = bounded(
            "blacklist add",
            self.op_timeout,
            conn.set_ex(&key, REVOKED_MARKER, secs),
        )
        .await?;
        Ok(())
    }

    async fn is_blacklisted(&self, jti: &str) -> Result<bool, AuthError> {
        let key = entry_key(&self.prefix, jti);
        let mut conn = self.conn.clone();
        bounded("blacklist check", self.op_timeout, conn.exists(&key)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_keyed_by_jti() {
        assert_eq!(entry_key("blacklist", "abc-123"), "blacklist:abc-123");
    }
}
