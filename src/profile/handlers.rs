use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{ProfileRequest, ProfileResponse, ProfileStatus};
use crate::{
    auth::{extractors::Caller, services::current_user},
    error::ApiError,
    policy::{authorize, Action},
    state::AppState,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile/create", post(upsert_profile))
        .route("/profile/me", get(get_my_profile))
        .route("/profile/check-status", get(check_status))
}

#[instrument(skip(state, caller, payload))]
pub async fn upsert_profile(
    State(state): State<AppState>,
    caller: Caller,
    Json(payload): Json<ProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let claims = authorize(caller.claims(), Action::ViewOwnData)?;
    let user = current_user(&state, claims).await?;

    if payload.full_name.trim().is_empty() {
        return Err(ApiError::invalid("Full name is required"));
    }

    let profile = state.store.upsert_profile(user.id, payload.into()).await?;
    state.store.mark_profile_completed(user.id).await?;

    info!(user_id = %user.id, skills = profile.skills.len(), "profile saved");
    Ok(Json(profile.into()))
}

#[instrument(skip(state, caller))]
pub async fn get_my_profile(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<ProfileResponse>, ApiError> {
    let claims = authorize(caller.claims(), Action::ViewOwnData)?;
    let user = current_user(&state, claims).await?;
    let profile = state
        .store
        .find_profile_by_user(user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile"))?;
    Ok(Json(profile.into()))
}

#[instrument(skip(state, caller))]
pub async fn check_status(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<ProfileStatus>, ApiError> {
    let claims = authorize(caller.claims(), Action::ViewOwnData)?;
    let user = current_user(&state, claims).await?;
    Ok(Json(ProfileStatus {
        profile_completed: user.profile_completed,
        user_id: user.id,
        email: user.email,
    }))
}
