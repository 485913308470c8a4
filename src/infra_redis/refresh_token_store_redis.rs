use super::bounded;
use crate::application_port::AuthError;
use crate::domain_model::{DeviceId, MemberId, RefreshToken};
use crate::domain_port::RefreshTokenStore;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::time::Duration;

pub struct RedisRefreshTokenStore {
    conn: ConnectionManager,
    prefix: String,
    ttl: Duration,
    op_timeout: Duration,
}

fn slot_key(prefix: &str, member_id: MemberId, device_id: &DeviceId) -> String {
    format!("{}:{}:{}", prefix, member_id, device_id)
}

fn member_pattern(prefix: &str, member_id: MemberId) -> String {
    format!("{}:{}:*", prefix, member_id)
}

impl RedisRefreshTokenStore {
    pub fn new(
        conn: ConnectionManager,
        prefix: impl Into<String>,
        ttl: Duration,
        op_timeout: Duration,
    ) -> Self {
        RedisRefreshTokenStore {
            conn,
            prefix: prefix.into(),
            ttl,
            op_timeout,
        }
    }
}

#[async_trait::async_trait]
impl RefreshTokenStore for RedisRefreshTokenStore {
    async fn save(
        &self,
        member_id: MemberId,
        device_id: &DeviceId,
        value: &RefreshToken,
    ) -> Result<(), AuthError> {
        let key = slot_key(&self.prefix, member_id, device_id);
        let mut conn = self.conn.clone();
        let _: () = bounded(
            "refresh save",
            self.op_timeout,
            conn.set_ex(&key, value.0.as_str(), self.ttl.as_secs()),
        )
        .await?;
        Ok(())
    }

    async fn find(
        &self,
        member_id: MemberId,
        device_id: &DeviceId,
    ) -> Result<Option<RefreshToken>, AuthError> {
        let key = slot_key(&self.prefix, member_id, device_id);
        let mut conn = self.conn.clone();
        let value: Option<String> = bounded("refresh find", self.op_timeout, conn.get(&key)).await?;
        Ok(value.map(RefreshToken))
    }

    async fn delete(&self, member_id: MemberId, device_id: &DeviceId) -> Result<(), AuthError> {
        let key = slot_key(&self.prefix, member_id, device_id);
        let mut conn = self.conn.clone();
        let _: () = bounded("refresh delete", self.op_timeout, conn.del(&key)).await?;
        Ok(())
    }

    async fn delete_all(&self, member_id: MemberId) -> Result<(), AuthError> {
        let pattern = member_pattern(&self.prefix, member_id);
        let mut conn = self.conn.clone();

        // Snapshot first, then delete. A slot written between the two steps
        // survives; the port documents that race as accepted.
        let keys: Vec<String> = bounded(
            "refresh keys",
            self.op_timeout,
            redis::cmd("KEYS").arg(&pattern).query_async(&mut conn),
        )
        .await?;

        if keys.is_empty() {
            return Ok(());
        }
        let _: () = bounded("refresh delete_all", self.op_timeout, conn.del(&keys)).await?;
        Ok(())
    }
}
