use super::is_dup_key;
use crate::application_port::AuthError;
use crate::domain_model::{MemberId, MemberRole, MemberStatus};
use crate::domain_port::{MemberRecord, MemberRepo};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use std::str::FromStr;

pub struct MySqlMemberRepo {
    pool: MySqlPool,
}

impl MySqlMemberRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlMemberRepo { pool }
    }

    fn row_to_record(row: MySqlRow) -> Result<MemberRecord, AuthError> {
        let id: i64 = row
            .try_get("id")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let email: String = row
            .try_get("email")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let password_hash: Option<String> = row
            .try_get("password_hash")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let nickname: String = row
            .try_get("nickname")
            .map_err(|e| AuthError::Store(e.to_string()))?;

        let role: String = row
            .try_get("role")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let role = MemberRole::from_str(&role).map_err(AuthError::Store)?;
        let status: String = row
            .try_get("status")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let status = MemberStatus::from_str(&status).map_err(AuthError::Store)?;

        Ok(MemberRecord {
            id: MemberId(id),
            email,
            password_hash,
            nickname,
            role,
            status,
        })
    }
}

#[async_trait::async_trait]
impl MemberRepo for MySqlMemberRepo {
    async fn create(
        &self,
        email: &str,
        password_hash: &str,
        nickname: &str,
    ) -> Result<MemberId, AuthError> {
        let result = sqlx::query(
            r#"
INSERT INTO member (email, password_hash, nickname, role, status)
VALUES (?, ?, ?, ?, ?)
"#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(nickname)
        .bind(MemberRole::User.as_str())
        .bind(MemberStatus::Active.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_dup_key(&e) {
                AuthError::MemberAlreadyExists
            } else {
                AuthError::Store(e.to_string())
            }
        })?;

        Ok(MemberId(result.last_insert_id() as i64))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<MemberRecord>, AuthError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT id, email, password_hash, nickname, role, status
FROM member
WHERE email = ?
"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Store(e.to_string()))?;

        row_opt.map(Self::row_to_record).transpose()
    }

    async fn find_by_id(&self, member_id: MemberId) -> Result<Option<MemberRecord>, AuthError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT id, email, password_hash, nickname, role, status
FROM member
WHERE id = ?
"#,
        )
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Store(e.to_string()))?;

        row_opt.map(Self::row_to_record).transpose()
    }

    async fn update_status(
        &self,
        member_id: MemberId,
        status: MemberStatus,
    ) -> Result<(), AuthError> {
        let result = sqlx::query(
            r#"
UPDATE member
SET status = ?
WHERE id = ?
"#,
        )
        .bind(status.as_str())
        .bind(member_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Store(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AuthError::MemberNotFound);
        }
        Ok(())
    }
}
