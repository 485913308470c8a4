use crate::application_port::{AuthError, CredentialHasher};

/// Identity "hash" so tests skip the argon2 cost and stay deterministic.
pub(crate) struct PlainHasher;

#[async_trait::async_trait]
impl CredentialHasher for PlainHasher {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        Ok(password.to_string())
    }

    async fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, AuthError> {
        Ok(password == password_hash)
    }
}
