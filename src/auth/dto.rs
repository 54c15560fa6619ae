use serde::{Deserialize, Serialize};

use crate::auth::repo_types::User;

/// Request body for sign-up.
#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub fullname: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: String,
}

/// Request body for email confirmation.
#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    #[serde(rename = "verificationCode")]
    pub verification_code: i32,
}

/// Request body for password sign-in.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Request body for Google sign-in: the provider token plus the profile
/// fields the mobile client received from Google.
#[derive(Debug, Deserialize)]
pub struct GoogleSignInRequest {
    #[serde(rename = "idToken")]
    pub id_token: Option<String>,
    pub user: GoogleUserPayload,
}

#[derive(Debug, Deserialize)]
pub struct GoogleUserPayload {
    pub email: String,
    pub name: String,
    pub photo: Option<String>,
    pub gender: Option<String>,
    pub birthdate: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub location: Option<String>,
}

/// Request body for token refresh. The field is optional so a missing
/// token maps to 401 rather than a deserialization error.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub code: i32,
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

/// Generic `{success, message}` response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Profile fields returned to the client after sign-in.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub fullname: String,
    pub email: String,
    pub location: Option<String>,
    pub birthdate: Option<String>,
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub avatar: String,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            fullname: user.fullname.clone(),
            email: user.email.clone(),
            location: user.location.clone(),
            birthdate: user.birthdate.clone(),
            gender: user.gender.clone(),
            height: user.height,
            weight: user.weight,
            avatar: user.avatar.clone().unwrap_or_default(),
        }
    }
}

/// Response for sign-in and Google sign-in.
#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub success: bool,
    pub user: PublicUser,
    pub token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

/// Response for token refresh.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_up_request_uses_camel_case_confirm_field() {
        let req: SignUpRequest = serde_json::from_str(
            r#"{"fullname":"Jane","email":"jane@x.com",
                "password":"Passw0rd!","confirmPassword":"Passw0rd!"}"#,
        )
        .unwrap();
        assert_eq!(req.confirm_password, "Passw0rd!");
    }

    #[test]
    fn google_payload_tolerates_missing_profile_fields() {
        let req: GoogleSignInRequest = serde_json::from_str(
            r#"{"idToken":"tok","user":{"email":"g@x.com","name":"G"}}"#,
        )
        .unwrap();
        assert_eq!(req.user.email, "g@x.com");
        assert!(req.user.photo.is_none());
        assert!(req.user.height.is_none());
    }

    #[test]
    fn refresh_request_token_is_optional() {
        let req: RefreshRequest = serde_json::from_str("{}").unwrap();
        assert!(req.token.is_none());
    }

    #[test]
    fn refresh_response_uses_camel_case_token_field() {
        let json = serde_json::to_string(&RefreshResponse {
            token: "a".into(),
            refresh_token: "r".into(),
        })
        .unwrap();
        assert!(json.contains("refreshToken"));
    }
}
