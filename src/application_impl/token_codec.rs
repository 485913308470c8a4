use crate::application_port::{AuthError, TokenCodec};
use crate::domain_model::{AccessClaims, AccessToken, MemberId, MemberRole};
use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::time::Duration;

/// Immutable signing configuration, injected at construction. Tests supply
/// their own deterministic key; nothing here is process-global.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub access_ttl: Duration,
    pub signing_key: Vec<u8>,
}

pub struct JwtHs256Codec {
    cfg: JwtConfig,
}

impl JwtHs256Codec {
    pub fn new(cfg: JwtConfig) -> Self {
        JwtHs256Codec { cfg }
    }

    #[inline]
    fn gen_jti() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    fn decode_with(&self, token: &str, validate_exp: bool) -> Result<AccessClaims, AuthError> {
        let mut v = Validation::new(Algorithm::HS256);
        v.validate_exp = validate_exp;
        // The default 60s leeway would keep a just-expired token verifiable;
        // the blacklist TTL math needs expiry to be exact.
        v.leeway = 0;
        let data = decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(&self.cfg.signing_key),
            &v,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid,
        })?;

        // Structure check: a subject that is not a member id never leaves
        // the codec as valid claims.
        data.claims.member_id()?;
        Ok(data.claims)
    }
}

impl TokenCodec for JwtHs256Codec {
    fn issue(
        &self,
        member_id: MemberId,
        role: MemberRole,
    ) -> Result<(AccessToken, AccessClaims), AuthError> {
        let iat = Utc::now().timestamp();
        let exp = iat + self.cfg.access_ttl.as_secs() as i64;
        let claims = AccessClaims {
            jti: Self::gen_jti(),
            sub: member_id.to_string(),
            role,
            iat,
            exp,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.cfg.signing_key),
        )
        .map_err(|e| AuthError::InternalError(e.to_string()))?;
        Ok((AccessToken(token), claims))
    }

    fn verify(&self, token: &AccessToken) -> Result<AccessClaims, AuthError> {
        self.decode_with(&token.0, true)
    }

    fn verify_ignoring_expiry(&self, token: &AccessToken) -> Result<AccessClaims, AuthError> {
        self.decode_with(&token.0, false)
    }

    fn remaining_lifetime(&self, claims: &AccessClaims) -> Duration {
        let remaining = claims.exp - Utc::now().timestamp();
        if remaining <= 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(remaining as u64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    const KEY: &[u8] = b"test-signing-key-of-reasonable-length";

    fn codec() -> JwtHs256Codec {
        JwtHs256Codec::new(JwtConfig {
            access_ttl: Duration::from_secs(1800),
            signing_key: KEY.to_vec(),
        })
    }

    /// Sign arbitrary claims with the test key, bypassing `issue`.
    fn sign<T: Serialize>(claims: &T) -> AccessToken {
        let token = encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(KEY),
        )
        .unwrap();
        AccessToken(token)
    }

    fn expired_claims() -> AccessClaims {
        let now = Utc::now().timestamp();
        AccessClaims {
            jti: "jti-expired".to_string(),
            sub: "7".to_string(),
            role: MemberRole::User,
            iat: now - 3600,
            exp: now - 1800,
        }
    }

    #[test]
    fn issue_then_verify_round_trips_subject_and_role() {
        let codec = codec();
        let (token, issued) = codec.issue(MemberId(42), MemberRole::Admin).unwrap();

        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.member_id().unwrap(), MemberId(42));
        assert_eq!(claims.role, MemberRole::Admin);
        assert_eq!(claims.jti, issued.jti);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn fresh_jti_per_issue() {
        let codec = codec();
        let (_, a) = codec.issue(MemberId(1), MemberRole::User).unwrap();
        let (_, b) = codec.issue(MemberId(1), MemberRole::User).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn garbage_token_is_invalid() {
        let err = codec().verify(&AccessToken("not.a.token".into())).unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid));
    }

    #[test]
    fn foreign_key_signature_is_invalid() {
        let other = JwtHs256Codec::new(JwtConfig {
            access_ttl: Duration::from_secs(1800),
            signing_key: b"a-completely-different-signing-key".to_vec(),
        });
        let (token, _) = other.issue(MemberId(1), MemberRole::User).unwrap();

        let err = codec().verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid));
    }

    #[test]
    fn expired_token_fails_verify_but_not_lenient_verify() {
        let codec = codec();
        let token = sign(&expired_claims());

        let err = codec.verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));

        let claims = codec.verify_ignoring_expiry(&token).unwrap();
        assert_eq!(claims.member_id().unwrap(), MemberId(7));
        assert_eq!(codec.remaining_lifetime(&claims), Duration::ZERO);
    }

    #[test]
    fn unknown_role_is_invalid_not_defaulted() {
        #[derive(Serialize)]
        struct RawClaims {
            jti: String,
            sub: String,
            role: String,
            iat: i64,
            exp: i64,
        }
        let now = Utc::now().timestamp();
        let token = sign(&RawClaims {
            jti: "jti-raw".to_string(),
            sub: "1".to_string(),
            role: "SUPERUSER".to_string(),
            iat: now,
            exp: now + 600,
        });

        let err = codec().verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid));
    }

    #[test]
    fn non_numeric_subject_is_invalid() {
        #[derive(Serialize)]
        struct RawClaims {
            jti: String,
            sub: String,
            role: MemberRole,
            iat: i64,
            exp: i64,
        }
        let now = Utc::now().timestamp();
        let token = sign(&RawClaims {
            jti: "jti-raw".to_string(),
            sub: "not-a-member-id".to_string(),
            role: MemberRole::User,
            iat: now,
            exp: now + 600,
        });

        let err = codec().verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid));
    }

    #[test]
    fn remaining_lifetime_is_positive_and_bounded_for_fresh_token() {
        let codec = codec();
        let (_, claims) = codec.issue(MemberId(1), MemberRole::User).unwrap();

        let remaining = codec.remaining_lifetime(&claims);
        assert!(remaining > Duration::ZERO);
        assert!(remaining <= Duration::from_secs(1800));
    }
}
