use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo_types::User;
use crate::profile::dto::UpdateProfileRequest;

pub async fn update_profile(
    db: &PgPool,
    user_id: Uuid,
    fields: &UpdateProfileRequest,
) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET
            fullname = COALESCE($2, fullname),
            birthdate = COALESCE($3, birthdate),
            location = COALESCE($4, location),
            gender = COALESCE($5, gender),
            height = COALESCE($6, height),
            weight = COALESCE($7, weight)
        WHERE id = $1
        RETURNING id, email, fullname, password_hash, google_token, verified,
                  verification_code, verification_code_expires_at, reset_code,
                  reset_code_expires_at, refresh_token, roles, avatar, birthdate,
                  gender, height, weight, location, created_at
        "#,
    )
    .bind(user_id)
    .bind(fields.fullname.as_deref())
    .bind(fields.birthdate.as_deref())
    .bind(fields.location.as_deref())
    .bind(fields.gender.as_deref())
    .bind(fields.height)
    .bind(fields.weight)
    .fetch_optional(db)
    .await?;
    Ok(user)
}
