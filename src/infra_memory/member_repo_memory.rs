use crate::application_port::AuthError;
use crate::domain_model::{MemberId, MemberRole, MemberStatus};
use crate::domain_port::{MemberRecord, MemberRepo};
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};

/// In-memory member records with autoincrement ids, mirroring the identity
/// column semantics of the MySQL adapter.
pub struct MemoryMemberRepo {
    next_id: AtomicI64,
    members: DashMap<MemberId, MemberRecord>,
}

impl MemoryMemberRepo {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            members: DashMap::new(),
        }
    }
}

impl Default for MemoryMemberRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMemberRepo {
    /// Fixture escape hatch: insert a fully specified record, bypassing the
    /// role/status defaults of `create`.
    pub fn seed(&self, record: MemberRecord) {
        let id = record.id;
        self.next_id.fetch_max(id.0 + 1, Ordering::Relaxed);
        self.members.insert(id, record);
    }
}

#[async_trait::async_trait]
impl MemberRepo for MemoryMemberRepo {
    async fn create(
        &self,
        email: &str,
        password_hash: &str,
        nickname: &str,
    ) -> Result<MemberId, AuthError> {
        if self.members.iter().any(|m| m.email == email) {
            return Err(AuthError::MemberAlreadyExists);
        }
        let id = MemberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.members.insert(
            id,
            MemberRecord {
                id,
                email: email.to_string(),
                password_hash: Some(password_hash.to_string()),
                nickname: nickname.to_string(),
                role: MemberRole::User,
                status: MemberStatus::Active,
            },
        );
        Ok(id)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<MemberRecord>, AuthError> {
        Ok(self
            .members
            .iter()
            .find(|m| m.email == email)
            .map(|m| m.value().clone()))
    }

    async fn find_by_id(&self, member_id: MemberId) -> Result<Option<MemberRecord>, AuthError> {
        Ok(self.members.get(&member_id).map(|m| m.value().clone()))
    }

    async fn update_status(
        &self,
        member_id: MemberId,
        status: MemberStatus,
    ) -> Result<(), AuthError> {
        match self.members.get_mut(&member_id) {
            Some(mut m) => {
                m.status = status;
                Ok(())
            }
            None => Err(AuthError::MemberNotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ids_are_sequential_and_lookups_agree() {
        let repo = MemoryMemberRepo::new();
        let a = repo.create("a@test.dev", "hash", "a").await.unwrap();
        let b = repo.create("b@test.dev", "hash", "b").await.unwrap();
        assert_ne!(a, b);

        let found = repo.find_by_email("b@test.dev").await.unwrap().unwrap();
        assert_eq!(found.id, b);
        assert_eq!(found.status, MemberStatus::Active);
        assert_eq!(found.role, MemberRole::User);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let repo = MemoryMemberRepo::new();
        repo.create("a@test.dev", "hash", "a").await.unwrap();
        let err = repo.create("a@test.dev", "hash", "a2").await.unwrap_err();
        assert!(matches!(err, AuthError::MemberAlreadyExists));
    }

    #[tokio::test]
    async fn update_status_of_missing_member_fails() {
        let repo = MemoryMemberRepo::new();
        let err = repo
            .update_status(MemberId(42), MemberStatus::Suspended)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::MemberNotFound));
    }
}
