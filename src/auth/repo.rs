use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{GoogleProfile, User};

const USER_COLUMNS: &str = "id, email, fullname, password_hash, google_token, verified, \
     verification_code, verification_code_expires_at, reset_code, reset_code_expires_at, \
     refresh_token, roles, avatar, birthdate, gender, height, weight, location, created_at";

impl User {
    /// Find a user by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user =
            sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(db)
                .await?;
        Ok(user)
    }

    /// Create a self-registered user: unverified, with a pending email code.
    pub async fn create(
        db: &PgPool,
        fullname: &str,
        email: &str,
        password_hash: &str,
        verification_code: i32,
        code_expires_at: OffsetDateTime,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users
                (fullname, email, password_hash, verified, verification_code,
                 verification_code_expires_at, roles)
            VALUES ($1, $2, $3, FALSE, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(fullname)
        .bind(email)
        .bind(password_hash)
        .bind(verification_code)
        .bind(code_expires_at)
        .bind(vec!["patient".to_string()])
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Create a Google-authenticated user: verified from the start.
    pub async fn create_google(
        db: &PgPool,
        email: &str,
        profile: &GoogleProfile<'_>,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users
                (fullname, email, google_token, verified, avatar, gender, birthdate,
                 height, weight, location, roles)
            VALUES ($1, $2, $3, TRUE, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(profile.fullname)
        .bind(email)
        .bind(profile.google_token)
        .bind(profile.avatar)
        .bind(profile.gender)
        .bind(profile.birthdate)
        .bind(profile.height)
        .bind(profile.weight)
        .bind(profile.location)
        .bind(vec!["patient".to_string()])
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Refresh a Google user's mutable profile fields, preferring new
    /// non-empty values over the stored ones.
    pub async fn update_google_profile(
        db: &PgPool,
        id: Uuid,
        profile: &GoogleProfile<'_>,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                fullname = COALESCE(NULLIF($2, ''), fullname),
                google_token = COALESCE($3, google_token),
                avatar = COALESCE(NULLIF($4, ''), avatar),
                gender = COALESCE(NULLIF($5, ''), gender),
                birthdate = COALESCE(NULLIF($6, ''), birthdate),
                height = COALESCE($7, height),
                weight = COALESCE($8, weight),
                location = COALESCE(NULLIF($9, ''), location)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(profile.fullname)
        .bind(profile.google_token)
        .bind(profile.avatar)
        .bind(profile.gender)
        .bind(profile.birthdate)
        .bind(profile.height)
        .bind(profile.weight)
        .bind(profile.location)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_verification_code(db: &PgPool, code: i32) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE verification_code = $1"
        ))
        .bind(code)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Flip the verified flag; a one-way transition.
    pub async fn mark_verified(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET verified = TRUE WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Overwrite the stored refresh token, invalidating any prior session.
    pub async fn store_refresh_token(db: &PgPool, id: Uuid, token: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET refresh_token = $2 WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Single-use rotation as one conditional update: the new token is
    /// written only if the presented one is still the stored value. Of two
    /// racing refresh calls with the same token, at most one matches.
    pub async fn rotate_refresh_token(
        db: &PgPool,
        id: Uuid,
        presented: &str,
        replacement: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET refresh_token = $3
            WHERE id = $1 AND refresh_token = $2
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(presented)
        .bind(replacement)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Attach a reset code to the account behind `email`, if any.
    pub async fn set_reset_code(
        db: &PgPool,
        email: &str,
        code: i32,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET reset_code = $2, reset_code_expires_at = $3
            WHERE email = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(email)
        .bind(code)
        .bind(expires_at)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_reset_code(db: &PgPool, code: i32) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE reset_code = $1"
        ))
        .bind(code)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Store a new password hash and clear the outstanding reset code.
    pub async fn update_password(db: &PgPool, id: Uuid, password_hash: &str) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, reset_code = NULL, reset_code_expires_at = NULL
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(db)
        .await?;
        Ok(())
    }
}
