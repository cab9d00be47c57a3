use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// User account record.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_email_verified: bool,
    #[serde(skip_serializing)]
    pub otp_code: Option<String>,
    #[serde(skip_serializing)]
    pub otp_expires_at: Option<OffsetDateTime>,
    pub is_admin: bool,
    pub last_login: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

const USER_COLUMNS: &str = "id, name, email, password_hash, is_email_verified, otp_code, \
                            otp_expires_at, is_admin, last_login, created_at";

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(db)
            .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(user)
    }

    /// Create an unverified user with a pending verification code.
    pub async fn create(
        db: &PgPool,
        name: &str,
        email: &str,
        password_hash: &str,
        otp_code: &str,
        otp_expires_at: OffsetDateTime,
    ) -> anyhow::Result<User> {
        let sql = format!(
            r#"
            INSERT INTO users (name, email, password_hash, otp_code, otp_expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
        "#
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(name)
            .bind(email)
            .bind(password_hash)
            .bind(otp_code)
            .bind(otp_expires_at)
            .fetch_one(db)
            .await?;
        Ok(user)
    }

    pub async fn set_otp(
        db: &PgPool,
        id: Uuid,
        otp_code: &str,
        otp_expires_at: OffsetDateTime,
    ) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET otp_code = $2, otp_expires_at = $3 WHERE id = $1")
            .bind(id)
            .bind(otp_code)
            .bind(otp_expires_at)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Mark the email verified and clear the pending code in the same write.
    pub async fn mark_verified(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let sql = format!(
            r#"
            UPDATE users
            SET is_email_verified = TRUE, otp_code = NULL, otp_expires_at = NULL
            WHERE id = $1
            RETURNING {USER_COLUMNS}
        "#
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(user)
    }

    pub async fn touch_last_login(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let sql = format!(
            "UPDATE users SET last_login = now() WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(user)
    }
}
