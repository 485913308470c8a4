use super::{MemberId, MemberRole};
use crate::application_port::AuthError;
use serde::{Deserialize, Serialize};

/// Signed bearer credential. Opaque to clients; only the codec looks inside.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken(pub String);

/// Opaque random secret, never parsed. Compared byte-for-byte against the
/// stored slot value on reissue.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RefreshToken(pub String);

impl RefreshToken {
    pub fn generate() -> Self {
        RefreshToken(uuid::Uuid::new_v4().to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
}

/// Payload of a signed access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub jti: String,
    pub sub: String,
    pub role: MemberRole,
    pub iat: i64,
    pub exp: i64,
}

impl AccessClaims {
    pub fn member_id(&self) -> Result<MemberId, AuthError> {
        self.sub
            .parse::<i64>()
            .map(MemberId)
            .map_err(|_| AuthError::TokenInvalid)
    }
}

/// Authenticated identity attached to a request once the inbound gate has
/// accepted its bearer token.
#[derive(Debug, Clone)]
pub struct Principal {
    pub member_id: MemberId,
    pub role: MemberRole,
    pub jti: String,
}

impl Principal {
    pub fn from_claims(claims: &AccessClaims) -> Result<Self, AuthError> {
        Ok(Principal {
            member_id: claims.member_id()?,
            role: claims.role,
            jti: claims.jti.clone(),
        })
    }
}
