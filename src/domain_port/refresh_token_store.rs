use crate::application_port::AuthError;
use crate::domain_model::{DeviceId, MemberId, RefreshToken};

/// Single-slot-per-device refresh token storage with TTL. The store owns
/// per-key atomicity; `save` and `delete` on the same `(member, device)` key
/// are linearizable from its perspective.
#[async_trait::async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Overwrite the slot unconditionally and reset its TTL to the configured
    /// refresh lifetime.
    async fn save(
        &self,
        member_id: MemberId,
        device_id: &DeviceId,
        value: &RefreshToken,
    ) -> Result<(), AuthError>;

    /// Read without sliding the TTL.
    async fn find(
        &self,
        member_id: MemberId,
        device_id: &DeviceId,
    ) -> Result<Option<RefreshToken>, AuthError>;

    /// Remove one slot. An absent slot is not an error.
    async fn delete(&self, member_id: MemberId, device_id: &DeviceId) -> Result<(), AuthError>;

    /// Remove every device slot of the member, operating on a best-effort
    /// snapshot of matching keys. A slot created while the sweep runs may
    /// survive it.
    async fn delete_all(&self, member_id: MemberId) -> Result<(), AuthError>;
}
