use crate::domain_model::{
    AccessClaims, AccessToken, DeviceId, MemberId, MemberRole, RefreshToken, TokenPair,
};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("member not found")]
    MemberNotFound,
    #[error("member suspended")]
    MemberSuspended,
    #[error("member already exists")]
    MemberAlreadyExists,
    #[error("invalid refresh token")]
    InvalidRefreshToken,
    #[error("token invalid")]
    TokenInvalid,
    #[error("token expired")]
    TokenExpired,
    #[error("token blacklisted")]
    TokenBlacklisted,
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(Debug, Clone)]
pub struct SignupInput {
    pub email: String,
    pub password: String,
    pub nickname: String,
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
    pub device_id: DeviceId,
}

/// Stateless access-token mint and check. Validity here is signature and
/// expiry only; the blacklist is the gate's concern.
pub trait TokenCodec: Send + Sync {
    fn issue(
        &self,
        member_id: MemberId,
        role: MemberRole,
    ) -> Result<(AccessToken, AccessClaims), AuthError>;

    fn verify(&self, token: &AccessToken) -> Result<AccessClaims, AuthError>;

    /// Like `verify`, but a past `exp` is not an error. Logout needs the jti
    /// and remaining lifetime of tokens that have already lapsed.
    fn verify_ignoring_expiry(&self, token: &AccessToken) -> Result<AccessClaims, AuthError>;

    fn remaining_lifetime(&self, claims: &AccessClaims) -> Duration;
}

#[async_trait::async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError>;
    async fn verify_password(&self, password: &str, password_hash: &str)
    -> Result<bool, AuthError>;
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Local email/password registration. Enabled only outside production.
    async fn signup(&self, input: SignupInput) -> Result<MemberId, AuthError>;

    async fn login(&self, input: LoginInput) -> Result<TokenPair, AuthError>;

    /// Rotate the refresh slot for `(member_id, device_id)`. A presented
    /// value that does not match the stored one is treated as a theft signal
    /// and revokes every device of the member before the error is returned.
    async fn reissue(
        &self,
        presented: &RefreshToken,
        member_id: MemberId,
        device_id: &DeviceId,
    ) -> Result<TokenPair, AuthError>;

    /// Blacklist the access token for its remaining lifetime and drop the
    /// refresh slot. Safe to call twice with the same token.
    async fn logout(
        &self,
        access_token: &AccessToken,
        member_id: MemberId,
        device_id: &DeviceId,
    ) -> Result<(), AuthError>;

    /// Drop every refresh slot of the member. Outstanding access tokens stay
    /// valid until their natural expiry.
    async fn revoke_all_sessions(&self, member_id: MemberId) -> Result<(), AuthError>;
}
