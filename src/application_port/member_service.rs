use super::AuthError;
use crate::domain_model::{MemberId, MemberRole, MemberStatus};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct MemberProfile {
    pub id: MemberId,
    pub email: String,
    pub nickname: String,
    pub role: MemberRole,
    pub status: MemberStatus,
}

#[async_trait::async_trait]
pub trait MemberService: Send + Sync {
    async fn profile(&self, member_id: MemberId) -> Result<MemberProfile, AuthError>;

    /// Self-service account closure. Revokes every refresh session; access
    /// tokens already in the wild run out on their own.
    async fn withdraw(&self, member_id: MemberId) -> Result<(), AuthError>;

    /// Administrative disable. Same revocation scope as `withdraw`.
    async fn suspend(&self, member_id: MemberId) -> Result<(), AuthError>;
}
