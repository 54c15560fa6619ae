use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use time::{Duration, OffsetDateTime};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        code::generate_code,
        dto::{
            ForgotPasswordRequest, GoogleSignInRequest, MessageResponse, PublicUser,
            RefreshRequest, RefreshResponse, ResetPasswordRequest, SignInRequest, SignInResponse,
            SignUpRequest, VerifyEmailRequest,
        },
        jwt::JwtKeys,
        password::{hash_password, password_length_ok, verify_password},
        repo_types::{GoogleProfile, User},
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/create-user", post(sign_up))
        .route("/verify-email", post(verify_email))
        .route("/sign-in", post(sign_in))
        .route("/google-signin", post(google_sign_in))
        .route("/refresh", post(refresh))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn code_expiry(state: &AppState) -> OffsetDateTime {
    OffsetDateTime::now_utc() + Duration::minutes(state.config.code_ttl_minutes)
}

/// Deliver a one-time code by email. Delivery failures are logged and
/// swallowed; the enclosing operation still succeeds.
async fn send_code_email(state: &AppState, to: &str, subject: &str, body: String) {
    if let Err(e) = state.mailer.send(to, subject, &body).await {
        error!(error = %e, "failed to send code email");
    }
}

#[instrument(skip(state, payload))]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<SignUpRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let email = payload.email.trim().to_string();

    if payload.fullname.trim().is_empty() {
        return Err(ApiError::Validation("fullname is required".into()));
    }
    if !is_valid_email(&email) {
        warn!("invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }
    if !password_length_ok(&payload.password) {
        warn!("password length out of bounds");
        return Err(ApiError::Validation(
            "Password must be 8 to 20 characters long".into(),
        ));
    }
    if payload.password != payload.confirm_password {
        return Err(ApiError::Validation("Passwords do not match".into()));
    }

    if User::find_by_email(&state.db, &email).await?.is_some() {
        warn!("email already in use");
        return Err(ApiError::EmailInUse);
    }

    let verification_code = generate_code();
    let hash = hash_password(&payload.password)?;

    let user = User::create(
        &state.db,
        payload.fullname.trim(),
        &email,
        &hash,
        verification_code,
        code_expiry(&state),
    )
    .await?;

    send_code_email(
        &state,
        &email,
        "Confirm your registration",
        format!(
            "Thank you for signing up. Your verification code is: {verification_code}"
        ),
    )
    .await;

    info!(user_id = %user.id, "user created, verification pending");
    Ok(Json(MessageResponse::ok(format!(
        "Verification code sent to {email}"
    ))))
}

#[instrument(skip(state, payload))]
pub async fn verify_email(
    State(state): State<AppState>,
    Json(payload): Json<VerifyEmailRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user = User::find_by_verification_code(&state.db, payload.verification_code)
        .await?
        .ok_or_else(|| {
            warn!("verification code not found");
            ApiError::NotFound
        })?;

    if user.verified {
        warn!(user_id = %user.id, "user already verified");
        return Err(ApiError::AlreadyVerified);
    }

    if let Some(expires_at) = user.verification_code_expires_at {
        if expires_at < OffsetDateTime::now_utc() {
            warn!(user_id = %user.id, "verification code expired");
            return Err(ApiError::CodeExpired);
        }
    }

    User::mark_verified(&state.db, user.id).await?;
    info!(user_id = %user.id, "user verified");
    Ok(Json(MessageResponse::ok("User verified successfully")))
}

#[instrument(skip(state, payload))]
pub async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<SignInRequest>,
) -> Result<Json<SignInResponse>, ApiError> {
    let user = User::find_by_email(&state.db, payload.email.trim())
        .await?
        .ok_or_else(|| {
            warn!("sign-in: unknown email");
            ApiError::NotFound
        })?;

    if !user.verified {
        warn!(user_id = %user.id, "sign-in: user not verified");
        return Err(ApiError::NotVerified);
    }

    // Google-only accounts carry no hash and cannot password sign-in.
    let hash = user
        .password_hash
        .as_deref()
        .ok_or(ApiError::InvalidCredentials)?;
    if !verify_password(&payload.password, hash)? {
        warn!(user_id = %user.id, "sign-in: wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign_access(user.id)?;
    let refresh_token = keys.sign_refresh(user.id)?;

    // A fresh sign-in replaces the stored refresh token, invalidating any
    // previous session.
    User::store_refresh_token(&state.db, user.id, &refresh_token).await?;

    info!(user_id = %user.id, "user signed in");
    Ok(Json(SignInResponse {
        success: true,
        user: PublicUser::from(&user),
        token,
        refresh_token,
    }))
}

#[instrument(skip(state, payload))]
pub async fn google_sign_in(
    State(state): State<AppState>,
    Json(payload): Json<GoogleSignInRequest>,
) -> Result<Json<SignInResponse>, ApiError> {
    let email = payload.user.email.trim().to_string();
    if !is_valid_email(&email) {
        return Err(ApiError::Validation("Invalid email".into()));
    }

    let profile = GoogleProfile {
        fullname: &payload.user.name,
        avatar: payload.user.photo.as_deref(),
        google_token: payload.id_token.as_deref(),
        gender: payload.user.gender.as_deref(),
        birthdate: payload.user.birthdate.as_deref(),
        height: payload.user.height,
        weight: payload.user.weight,
        location: payload.user.location.as_deref(),
    };

    // Update-or-create keyed on email; repeated calls with the same payload
    // converge on the same record.
    let user = match User::find_by_email(&state.db, &email).await? {
        Some(existing) => {
            let updated = User::update_google_profile(&state.db, existing.id, &profile).await?;
            info!(user_id = %updated.id, "google sign-in: existing user");
            updated
        }
        None => {
            let created = User::create_google(&state.db, &email, &profile).await?;
            info!(user_id = %created.id, "google sign-in: new user");
            created
        }
    };

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign_access(user.id)?;
    let refresh_token = keys.sign_refresh(user.id)?;
    User::store_refresh_token(&state.db, user.id, &refresh_token).await?;

    Ok(Json(SignInResponse {
        success: true,
        user: PublicUser::from(&user),
        token,
        refresh_token,
    }))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let presented = match payload.token.as_deref() {
        Some(t) if !t.is_empty() => t,
        _ => return Err(ApiError::Unauthenticated),
    };

    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_refresh(presented).map_err(|e| {
        warn!(error = %e, "refresh token failed verification");
        ApiError::InvalidSignature
    })?;

    let token = keys.sign_access(claims.sub)?;
    let refresh_token = keys.sign_refresh(claims.sub)?;

    // Single-use rotation: the conditional update only succeeds while the
    // presented token is still the stored one. A rotated-out token (reuse)
    // matches nothing and is rejected.
    let user = User::rotate_refresh_token(&state.db, claims.sub, presented, &refresh_token)
        .await?
        .ok_or_else(|| {
            warn!(user_id = %claims.sub, "refresh token reuse detected");
            ApiError::InvalidToken
        })?;

    info!(user_id = %user.id, "refresh token rotated");
    Ok(Json(RefreshResponse {
        token,
        refresh_token,
    }))
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let email = payload.email.trim();
    let reset_code = generate_code();

    match User::set_reset_code(&state.db, email, reset_code, code_expiry(&state)).await? {
        Some(user) => {
            send_code_email(
                &state,
                email,
                "Reset your password",
                format!("Your password reset code is: {reset_code}"),
            )
            .await;
            info!(user_id = %user.id, "reset code issued");
        }
        None => {
            // Same response either way so the endpoint does not reveal
            // which emails have accounts.
            warn!("forgot-password for unknown email");
        }
    }

    Ok(Json(MessageResponse::ok(
        "If an account exists for this email, a reset code has been sent",
    )))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user = User::find_by_reset_code(&state.db, payload.code)
        .await?
        .ok_or_else(|| {
            warn!("invalid reset code");
            ApiError::InvalidCode
        })?;

    if let Some(expires_at) = user.reset_code_expires_at {
        if expires_at < OffsetDateTime::now_utc() {
            warn!(user_id = %user.id, "reset code expired");
            return Err(ApiError::CodeExpired);
        }
    }

    if let Some(hash) = user.password_hash.as_deref() {
        if verify_password(&payload.new_password, hash)? {
            warn!(user_id = %user.id, "reset to identical password rejected");
            return Err(ApiError::SamePassword);
        }
    }

    if !password_length_ok(&payload.new_password) {
        return Err(ApiError::InvalidLength);
    }

    let new_hash = hash_password(&payload.new_password)?;
    User::update_password(&state.db, user.id, &new_hash).await?;

    info!(user_id = %user.id, "password reset");
    Ok(Json(MessageResponse::ok("Password reset successfully")))
}
