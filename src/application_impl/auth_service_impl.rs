use crate::application_port::{
    AuthError, AuthService, CredentialHasher, LoginInput, SignupInput, TokenCodec,
};
use crate::domain_model::{
    AccessToken, DeviceId, MemberId, MemberStatus, RefreshToken, TokenPair,
};
use crate::domain_port::{MemberRecord, MemberRepo, RefreshTokenStore, TokenBlacklist};
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use std::sync::Arc;
use tracing::{error, warn};

pub struct Argon2PasswordHasher;

#[async_trait::async_trait]
impl CredentialHasher for Argon2PasswordHasher {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = argon2::password_hash::SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::InternalError(e.to_string()))?
            .to_string();
        Ok(hash)
    }

    async fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(password_hash).map_err(|e| {
            AuthError::InternalError(format!("invalid PHC hash: {}", e))
        })?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::InternalError(format!("verify error: {}", e))),
        }
    }
}

/// Orchestrates the per-(member, device) session state machine over the
/// refresh and blacklist stores. Holds no mutable state of its own; per-key
/// atomicity belongs to the stores.
pub struct SessionAuthService {
    member_repo: Arc<dyn MemberRepo>,
    refresh_store: Arc<dyn RefreshTokenStore>,
    blacklist: Arc<dyn TokenBlacklist>,
    token_codec: Arc<dyn TokenCodec>,
    credential_hasher: Arc<dyn CredentialHasher>,
}

impl SessionAuthService {
    pub fn new(
        member_repo: Arc<dyn MemberRepo>,
        refresh_store: Arc<dyn RefreshTokenStore>,
        blacklist: Arc<dyn TokenBlacklist>,
        token_codec: Arc<dyn TokenCodec>,
        credential_hasher: Arc<dyn CredentialHasher>,
    ) -> Self {
        Self {
            member_repo,
            refresh_store,
            blacklist,
            token_codec,
            credential_hasher,
        }
    }

    async fn issue_token_pair(
        &self,
        member: &MemberRecord,
        device_id: &DeviceId,
    ) -> Result<TokenPair, AuthError> {
        let (access_token, _claims) = self.token_codec.issue(member.id, member.role)?;
        let refresh_token = RefreshToken::generate();
        self.refresh_store
            .save(member.id, device_id, &refresh_token)
            .await?;
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}

#[async_trait::async_trait]
impl AuthService for SessionAuthService {
    async fn signup(&self, input: SignupInput) -> Result<MemberId, AuthError> {
        let SignupInput {
            email,
            password,
            nickname,
        } = input;

        if self.member_repo.find_by_email(&email).await?.is_some() {
            return Err(AuthError::MemberAlreadyExists);
        }

        let password_hash = self.credential_hasher.hash_password(&password).await?;
        self.member_repo
            .create(&email, &password_hash, &nickname)
            .await
    }

    async fn login(&self, input: LoginInput) -> Result<TokenPair, AuthError> {
        let LoginInput {
            email,
            password,
            device_id,
        } = input;

        // Unknown email and wrong password are indistinguishable to the
        // caller; nothing here may leak which accounts exist.
        let member = self
            .member_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let hash = member
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;
        if !self.credential_hasher.verify_password(&password, hash).await? {
            return Err(AuthError::InvalidCredentials);
        }

        if !member.status.is_active() {
            return Err(match member.status {
                MemberStatus::Suspended => AuthError::MemberSuspended,
                _ => AuthError::MemberNotFound,
            });
        }

        self.issue_token_pair(&member, &device_id).await
    }

    async fn reissue(
        &self,
        presented: &RefreshToken,
        member_id: MemberId,
        device_id: &DeviceId,
    ) -> Result<TokenPair, AuthError> {
        let stored = self
            .refresh_store
            .find(member_id, device_id)
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;

        if stored != *presented {
            // A value that was already rotated out is the theft signal: the
            // holder of the stale token is not the holder of the slot. Revoke
            // every device before reporting the failure.
            warn!(
                member = %member_id,
                device = %device_id,
                "refresh token mismatch, revoking all sessions"
            );
            if let Err(e) = self.refresh_store.delete_all(member_id).await {
                error!(
                    member = %member_id,
                    error = %e,
                    "session sweep failed after refresh token mismatch"
                );
            }
            return Err(AuthError::InvalidRefreshToken);
        }

        let member = self
            .member_repo
            .find_by_id(member_id)
            .await?
            .ok_or(AuthError::MemberNotFound)?;
        if !member.status.is_active() {
            return Err(AuthError::MemberSuspended);
        }

        self.refresh_store.delete(member_id, device_id).await?;
        self.issue_token_pair(&member, device_id).await
    }

    async fn logout(
        &self,
        access_token: &AccessToken,
        member_id: MemberId,
        device_id: &DeviceId,
    ) -> Result<(), AuthError> {
        // Lenient parse: a client may log out after its access token lapsed
        // but while the refresh slot is still live.
        let claims = self.token_codec.verify_ignoring_expiry(access_token)?;
        let remaining = self.token_codec.remaining_lifetime(&claims);

        self.blacklist.add(&claims.jti, remaining).await?;
        self.refresh_store.delete(member_id, device_id).await?;
        Ok(())
    }

    async fn revoke_all_sessions(&self, member_id: MemberId) -> Result<(), AuthError> {
        self.refresh_store.delete_all(member_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::{JwtConfig, JwtHs256Codec};
    use crate::domain_model::MemberRole;
    use crate::infra_memory::{MemoryMemberRepo, MemoryRefreshTokenStore, MemoryTokenBlacklist};
    use crate::testutil::PlainHasher;
    use std::time::Duration;

    struct Harness {
        service: SessionAuthService,
        members: Arc<MemoryMemberRepo>,
        refresh: Arc<MemoryRefreshTokenStore>,
        blacklist: Arc<MemoryTokenBlacklist>,
        codec: Arc<JwtHs256Codec>,
    }

    fn harness() -> Harness {
        let members = Arc::new(MemoryMemberRepo::new());
        let refresh = Arc::new(MemoryRefreshTokenStore::new(Duration::from_secs(3600)));
        let blacklist = Arc::new(MemoryTokenBlacklist::new());
        let codec = Arc::new(JwtHs256Codec::new(JwtConfig {
            access_ttl: Duration::from_secs(1800),
            signing_key: b"service-test-signing-key".to_vec(),
        }));
        let service = SessionAuthService::new(
            members.clone(),
            refresh.clone(),
            blacklist.clone(),
            codec.clone(),
            Arc::new(PlainHasher),
        );
        Harness {
            service,
            members,
            refresh,
            blacklist,
            codec,
        }
    }

    async fn seed_member(h: &Harness, email: &str) -> MemberId {
        h.members.create(email, "pw", "tester").await.unwrap()
    }

    fn login_input(email: &str, password: &str, device: &str) -> LoginInput {
        LoginInput {
            email: email.to_string(),
            password: password.to_string(),
            device_id: DeviceId::from(device),
        }
    }

    #[tokio::test]
    async fn login_returns_pair_and_populates_slot() {
        let h = harness();
        let id = seed_member(&h, "u1@test.dev").await;

        let pair = h
            .service
            .login(login_input("u1@test.dev", "pw", "d1"))
            .await
            .unwrap();

        let stored = h
            .refresh
            .find(id, &DeviceId::from("d1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, pair.refresh_token);

        let claims = h.codec.verify(&pair.access_token).unwrap();
        assert_eq!(claims.member_id().unwrap(), id);
        assert_eq!(claims.role, MemberRole::User);
    }

    #[tokio::test]
    async fn login_unknown_email_and_wrong_password_are_indistinguishable() {
        let h = harness();
        seed_member(&h, "u1@test.dev").await;

        let unknown = h
            .service
            .login(login_input("nobody@test.dev", "pw", "d1"))
            .await
            .unwrap_err();
        let wrong = h
            .service
            .login(login_input("u1@test.dev", "bad", "d1"))
            .await
            .unwrap_err();

        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(wrong, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_suspended_and_withdrawn_map_to_distinct_errors() {
        let h = harness();
        let suspended = seed_member(&h, "s@test.dev").await;
        let withdrawn = seed_member(&h, "w@test.dev").await;
        h.members
            .update_status(suspended, MemberStatus::Suspended)
            .await
            .unwrap();
        h.members
            .update_status(withdrawn, MemberStatus::Withdrawn)
            .await
            .unwrap();

        let err = h
            .service
            .login(login_input("s@test.dev", "pw", "d1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::MemberSuspended));

        let err = h
            .service
            .login(login_input("w@test.dev", "pw", "d1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::MemberNotFound));
    }

    #[tokio::test]
    async fn reissue_rotates_exactly_once() {
        let h = harness();
        let id = seed_member(&h, "u1@test.dev").await;
        let d1 = DeviceId::from("d1");

        let first = h
            .service
            .login(login_input("u1@test.dev", "pw", "d1"))
            .await
            .unwrap();

        let second = h
            .service
            .reissue(&first.refresh_token, id, &d1)
            .await
            .unwrap();
        assert_ne!(first.refresh_token, second.refresh_token);

        // The rotated-out value is single-use.
        let err = h
            .service
            .reissue(&first.refresh_token, id, &d1)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidRefreshToken));
    }

    #[tokio::test]
    async fn stale_reissue_sweeps_every_device_of_the_member() {
        let h = harness();
        let id = seed_member(&h, "u1@test.dev").await;
        let other = seed_member(&h, "u2@test.dev").await;
        let d1 = DeviceId::from("d1");
        let d2 = DeviceId::from("d2");

        let stale = h
            .service
            .login(login_input("u1@test.dev", "pw", "d1"))
            .await
            .unwrap();
        let sibling = h
            .service
            .login(login_input("u1@test.dev", "pw", "d2"))
            .await
            .unwrap();
        let unrelated = h
            .service
            .login(login_input("u2@test.dev", "pw", "d1"))
            .await
            .unwrap();

        let rotated = h.service.reissue(&stale.refresh_token, id, &d1).await.unwrap();

        // Replay of the stale value: theft signal.
        let err = h
            .service
            .reissue(&stale.refresh_token, id, &d1)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidRefreshToken));

        // The sweep destroyed the rotated slot and the sibling device's slot.
        let err = h
            .service
            .reissue(&rotated.refresh_token, id, &d1)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidRefreshToken));
        let err = h
            .service
            .reissue(&sibling.refresh_token, id, &d2)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidRefreshToken));

        // Another member's session is untouched.
        h.service
            .reissue(&unrelated.refresh_token, other, &d1)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn reissue_without_slot_fails() {
        let h = harness();
        let id = seed_member(&h, "u1@test.dev").await;

        let err = h
            .service
            .reissue(&RefreshToken::generate(), id, &DeviceId::from("d1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidRefreshToken));
    }

    #[tokio::test]
    async fn reissue_for_inactive_member_fails_after_match() {
        let h = harness();
        let id = seed_member(&h, "u1@test.dev").await;
        let d1 = DeviceId::from("d1");

        let pair = h
            .service
            .login(login_input("u1@test.dev", "pw", "d1"))
            .await
            .unwrap();
        h.members
            .update_status(id, MemberStatus::Suspended)
            .await
            .unwrap();

        let err = h
            .service
            .reissue(&pair.refresh_token, id, &d1)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::MemberSuspended));
    }

    #[tokio::test]
    async fn logout_blacklists_and_drops_slot_idempotently() {
        let h = harness();
        let id = seed_member(&h, "u1@test.dev").await;
        let d1 = DeviceId::from("d1");

        let pair = h
            .service
            .login(login_input("u1@test.dev", "pw", "d1"))
            .await
            .unwrap();
        let jti = h.codec.verify(&pair.access_token).unwrap().jti;

        h.service.logout(&pair.access_token, id, &d1).await.unwrap();
        assert!(h.blacklist.is_blacklisted(&jti).await.unwrap());
        assert!(h.refresh.find(id, &d1).await.unwrap().is_none());

        // Second logout with the same token: no error, no new state.
        h.service.logout(&pair.access_token, id, &d1).await.unwrap();
        assert!(h.blacklist.is_blacklisted(&jti).await.unwrap());
    }

    #[tokio::test]
    async fn logout_of_expired_token_writes_no_blacklist_entry() {
        use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};

        let h = harness();
        let id = seed_member(&h, "u1@test.dev").await;
        let now = chrono::Utc::now().timestamp();
        let claims = crate::domain_model::AccessClaims {
            jti: "jti-lapsed".to_string(),
            sub: id.to_string(),
            role: MemberRole::User,
            iat: now - 3600,
            exp: now - 60,
        };
        let token = AccessToken(
            encode(
                &Header::new(Algorithm::HS256),
                &claims,
                &EncodingKey::from_secret(b"service-test-signing-key"),
            )
            .unwrap(),
        );

        h.service
            .logout(&token, id, &DeviceId::from("d1"))
            .await
            .unwrap();

        // Expired tokens already fail verification; a blacklist entry would
        // be dead weight.
        assert!(!h.blacklist.is_blacklisted("jti-lapsed").await.unwrap());
        assert!(matches!(
            h.codec.verify(&token).unwrap_err(),
            AuthError::TokenExpired
        ));
    }

    #[tokio::test]
    async fn revoke_all_sessions_clears_every_device() {
        let h = harness();
        let id = seed_member(&h, "u1@test.dev").await;

        h.service
            .login(login_input("u1@test.dev", "pw", "d1"))
            .await
            .unwrap();
        h.service
            .login(login_input("u1@test.dev", "pw", "d2"))
            .await
            .unwrap();

        h.service.revoke_all_sessions(id).await.unwrap();

        assert!(h.refresh.find(id, &DeviceId::from("d1")).await.unwrap().is_none());
        assert!(h.refresh.find(id, &DeviceId::from("d2")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn signup_rejects_duplicate_email() {
        let h = harness();
        let input = SignupInput {
            email: "u1@test.dev".to_string(),
            password: "pw".to_string(),
            nickname: "tester".to_string(),
        };

        h.service.signup(input.clone()).await.unwrap();
        let err = h.service.signup(input).await.unwrap_err();
        assert!(matches!(err, AuthError::MemberAlreadyExists));
    }

    #[tokio::test]
    async fn argon2_hasher_round_trip() {
        let hasher = Argon2PasswordHasher;
        let hash = hasher.hash_password("s3cret!").await.unwrap();

        assert!(hasher.verify_password("s3cret!", &hash).await.unwrap());
        assert!(!hasher.verify_password("wrong", &hash).await.unwrap());
    }
}
