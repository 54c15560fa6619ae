use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{extractors::AuthUser, repo_types::User},
    error::ApiError,
    profile::{
        dto::{ProfileResponse, UpdateProfileRequest},
        repo,
    },
    state::AppState,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/update-profile", post(update_profile))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = User::find_by_id(&state.db, user_id).await?.ok_or_else(|| {
        // Valid token for a record that no longer exists.
        warn!(user_id = %user_id, "me: user gone");
        ApiError::Unauthenticated
    })?;

    Ok(Json(ProfileResponse::from_user(&user)))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    if payload.is_empty() {
        return Err(ApiError::Validation("No fields provided for update".into()));
    }

    let user = repo::update_profile(&state.db, user_id, &payload)
        .await?
        .ok_or_else(|| {
            warn!(user_id = %user_id, "update-profile: user gone");
            ApiError::Unauthenticated
        })?;

    info!(user_id = %user.id, "profile updated");
    Ok(Json(ProfileResponse::from_user(&user)))
}
