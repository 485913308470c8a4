use crate::application_port::{AuthError, AuthService, MemberProfile, MemberService};
use crate::domain_model::{MemberId, MemberStatus};
use crate::domain_port::{MemberRecord, MemberRepo};
use std::sync::Arc;
use tracing::info;

pub struct AccountMemberService {
    member_repo: Arc<dyn MemberRepo>,
    auth_service: Arc<dyn AuthService>,
}

impl AccountMemberService {
    pub fn new(member_repo: Arc<dyn MemberRepo>, auth_service: Arc<dyn AuthService>) -> Self {
        Self {
            member_repo,
            auth_service,
        }
    }

    async fn find_active(&self, member_id: MemberId) -> Result<MemberRecord, AuthError> {
        let member = self
            .member_repo
            .find_by_id(member_id)
            .await?
            .ok_or(AuthError::MemberNotFound)?;
        if !member.status.is_active() {
            return Err(AuthError::MemberSuspended);
        }
        Ok(member)
    }
}

#[async_trait::async_trait]
impl MemberService for AccountMemberService {
    async fn profile(&self, member_id: MemberId) -> Result<MemberProfile, AuthError> {
        let member = self.find_active(member_id).await?;
        Ok(MemberProfile {
            id: member.id,
            email: member.email,
            nickname: member.nickname,
            role: member.role,
            status: member.status,
        })
    }

    async fn withdraw(&self, member_id: MemberId) -> Result<(), AuthError> {
        self.find_active(member_id).await?;
        self.member_repo
            .update_status(member_id, MemberStatus::Withdrawn)
            .await?;
        self.auth_service.revoke_all_sessions(member_id).await?;
        info!(member = %member_id, "member withdrawn, refresh sessions revoked");
        Ok(())
    }

    async fn suspend(&self, member_id: MemberId) -> Result<(), AuthError> {
        self.find_active(member_id).await?;
        self.member_repo
            .update_status(member_id, MemberStatus::Suspended)
            .await?;
        self.auth_service.revoke_all_sessions(member_id).await?;
        info!(member = %member_id, "member suspended, refresh sessions revoked");
        Ok(())
    }
}
