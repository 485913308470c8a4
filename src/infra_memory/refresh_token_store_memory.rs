use super::ExpirySweep;
use crate::application_port::AuthError;
use crate::domain_model::{DeviceId, MemberId, RefreshToken};
use crate::domain_port::RefreshTokenStore;
use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Reference implementation of the refresh slot store. Expiry is enforced
/// lazily on read and by the shared sweeper task.
pub struct MemoryRefreshTokenStore {
    ttl: Duration,
    slots: DashMap<(MemberId, String), (RefreshToken, Instant)>,
}

impl MemoryRefreshTokenStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: DashMap::new(),
        }
    }

    fn key(member_id: MemberId, device_id: &DeviceId) -> (MemberId, String) {
        (member_id, device_id.as_str().to_string())
    }
}

#[async_trait::async_trait]
impl RefreshTokenStore for MemoryRefreshTokenStore {
    async fn save(
        &self,
        member_id: MemberId,
        device_id: &DeviceId,
        value: &RefreshToken,
    ) -> Result<(), AuthError> {
        self.slots.insert(
            Self::key(member_id, device_id),
            (value.clone(), Instant::now() + self.ttl),
        );
        Ok(())
    }

    async fn find(
        &self,
        member_id: MemberId,
        device_id: &DeviceId,
    ) -> Result<Option<RefreshToken>, AuthError> {
        let key = Self::key(member_id, device_id);
        if let Some(entry) = self.slots.get(&key) {
            let (value, expires_at) = entry.value().clone();
            if expires_at > Instant::now() {
                return Ok(Some(value));
            }
            drop(entry);
            self.slots.remove(&key);
        }
        Ok(None)
    }

    async fn delete(&self, member_id: MemberId, device_id: &DeviceId) -> Result<(), AuthError> {
        self.slots.remove(&Self::key(member_id, device_id));
        Ok(())
    }

    async fn delete_all(&self, member_id: MemberId) -> Result<(), AuthError> {
        self.slots.retain(|(member, _), _| *member != member_id);
        Ok(())
    }
}

impl ExpirySweep for MemoryRefreshTokenStore {
    fn sweep(&self) {
        let now = Instant::now();
        self.slots.retain(|_, (_, expires_at)| *expires_at > now);
    }
}
