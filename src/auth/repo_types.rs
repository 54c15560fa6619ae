use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
///
/// One polymorphic record covers self-registered patients, Google-created
/// patients and staff accounts; the difference lives in `roles`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,                     // unique user ID
    pub email: String,                // unique across the store
    pub fullname: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>, // Argon2 hash; NULL for Google-only accounts
    #[serde(skip_serializing)]
    pub google_token: Option<String>, // last Google ID token presented
    pub verified: bool,
    #[serde(skip_serializing)]
    pub verification_code: Option<i32>, // 6-digit email confirmation code
    #[serde(skip_serializing)]
    pub verification_code_expires_at: Option<OffsetDateTime>,
    #[serde(skip_serializing)]
    pub reset_code: Option<i32>, // 6-digit password reset code
    #[serde(skip_serializing)]
    pub reset_code_expires_at: Option<OffsetDateTime>,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>, // at most one live session per user
    pub roles: Vec<String>,
    pub avatar: Option<String>,
    pub birthdate: Option<String>,
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub location: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Roles assigned at account creation, immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Patient,
    Doctor,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Patient => "patient",
            UserRole::Doctor => "doctor",
            UserRole::Admin => "admin",
        }
    }
}

impl User {
    /// Thin policy check for role-gated endpoints.
    pub fn has_role(&self, role: UserRole) -> bool {
        self.roles.iter().any(|r| r == role.as_str())
    }
}

/// Profile fields carried by a Google sign-in payload.
///
/// Empty strings and absent numbers mean "keep whatever is stored".
#[derive(Debug)]
pub struct GoogleProfile<'a> {
    pub fullname: &'a str,
    pub avatar: Option<&'a str>,
    pub google_token: Option<&'a str>,
    pub gender: Option<&'a str>,
    pub birthdate: Option<&'a str>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub location: Option<&'a str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_roles(roles: &[&str]) -> User {
        User {
            id: Uuid::new_v4(),
            email: "a@b.c".into(),
            fullname: "A".into(),
            password_hash: None,
            google_token: None,
            verified: true,
            verification_code: None,
            verification_code_expires_at: None,
            reset_code: None,
            reset_code_expires_at: None,
            refresh_token: None,
            roles: roles.iter().map(|r| r.to_string()).collect(),
            avatar: None,
            birthdate: None,
            gender: None,
            height: None,
            weight: None,
            location: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn has_role_checks_the_role_set() {
        let patient = user_with_roles(&["patient"]);
        assert!(patient.has_role(UserRole::Patient));
        assert!(!patient.has_role(UserRole::Admin));

        let staff = user_with_roles(&["doctor", "admin"]);
        assert!(staff.has_role(UserRole::Doctor));
        assert!(staff.has_role(UserRole::Admin));
        assert!(!staff.has_role(UserRole::Patient));
    }

    #[test]
    fn secrets_are_not_serialized() {
        let mut user = user_with_roles(&["patient"]);
        user.password_hash = Some("argon2-hash".into());
        user.refresh_token = Some("refresh".into());
        user.verification_code = Some(123456);
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2-hash"));
        assert!(!json.contains("refresh"));
        assert!(!json.contains("123456"));
    }
}
