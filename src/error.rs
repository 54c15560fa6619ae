use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// API error taxonomy.
///
/// Expected business failures (unknown email, wrong code, and so on) are
/// reported as 200 responses with `success: false` so mobile clients branch
/// on the body, not the status line. HTTP statuses are reserved for protocol
/// failures: 400 malformed input, 401/403 token problems, 500 internal.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("This email is already in use, try sign-in")]
    EmailInUse,

    #[error("User not found")]
    NotFound,

    #[error("User is not verified yet!")]
    NotVerified,

    #[error("Password is incorrect!")]
    InvalidCredentials,

    #[error("User already verified")]
    AlreadyVerified,

    #[error("Invalid verification code")]
    InvalidCode,

    #[error("Verification code has expired")]
    CodeExpired,

    #[error("New password must be different from the old one")]
    SamePassword,

    #[error("Password must be 8 to 20 characters long")]
    InvalidLength,

    #[error("You are not authenticated!")]
    Unauthenticated,

    #[error("Refresh token is not valid!")]
    InvalidSignature,

    #[error("Refresh token is not valid!")]
    InvalidToken,

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

/// Failure body: `{"success": false, "message": ...}`.
#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::EmailInUse
            | ApiError::NotFound
            | ApiError::NotVerified
            | ApiError::InvalidCredentials
            | ApiError::AlreadyVerified
            | ApiError::InvalidCode
            | ApiError::CodeExpired
            | ApiError::SamePassword
            | ApiError::InvalidLength => StatusCode::OK,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::InvalidSignature | ApiError::InvalidToken => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                // Generic message to the client, details stay in logs.
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        let body = ErrorBody {
            success: false,
            message,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_failures_are_200_with_success_false() {
        for err in [
            ApiError::EmailInUse,
            ApiError::NotFound,
            ApiError::NotVerified,
            ApiError::InvalidCredentials,
            ApiError::AlreadyVerified,
            ApiError::InvalidCode,
            ApiError::CodeExpired,
            ApiError::SamePassword,
            ApiError::InvalidLength,
        ] {
            assert_eq!(err.status(), StatusCode::OK);
        }
    }

    #[test]
    fn refresh_protocol_failures_keep_http_semantics() {
        assert_eq!(ApiError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::InvalidSignature.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::InvalidToken.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::Validation("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn internal_error_hides_details() {
        let err = ApiError::Internal(anyhow::anyhow!("connection refused to 10.0.0.3"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Internal server error");
    }
}
