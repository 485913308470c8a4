use crate::application_port::AuthError;
use crate::domain_model::{MemberId, MemberRole, MemberStatus};

#[derive(Debug, Clone)]
pub struct MemberRecord {
    pub id: MemberId,
    pub email: String,
    /// PHC string. `None` for accounts without a local credential.
    pub password_hash: Option<String>,
    pub nickname: String,
    pub role: MemberRole,
    pub status: MemberStatus,
}

#[async_trait::async_trait]
pub trait MemberRepo: Send + Sync {
    /// Insert a new active member with the `User` role. Duplicate email is
    /// `MemberAlreadyExists`.
    async fn create(
        &self,
        email: &str,
        password_hash: &str,
        nickname: &str,
    ) -> Result<MemberId, AuthError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<MemberRecord>, AuthError>;

    async fn find_by_id(&self, member_id: MemberId) -> Result<Option<MemberRecord>, AuthError>;

    /// `MemberNotFound` when no row matches.
    async fn update_status(
        &self,
        member_id: MemberId,
        status: MemberStatus,
    ) -> Result<(), AuthError>;
}
