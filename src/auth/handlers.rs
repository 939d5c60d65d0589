use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        claims::ClaimRequest,
        dto::{
            ForgotPasswordRequest, ForgotPasswordResponse, LoginRequest, MessageResponse,
            RegisterRequest, ResetPasswordRequest, TokenResponse, UserResponse,
            VerifyResetTokenRequest, VerifyResetTokenResponse,
        },
        extractors::Caller,
        repo_types::{NewUser, User},
        services::{
            check_full_name, check_new_password, current_user, hash_blocking, issue_session,
            normalize_email, reset_subject, verify_blocking,
        },
    },
    error::ApiError,
    policy::{authorize, registration_role, Action},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
        .route("/auth/verify-reset-token", post(verify_reset_token))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    let email = normalize_email(&payload.email)?;
    let full_name = check_full_name(&payload.full_name)?;
    check_new_password(&payload.password, &payload.confirm_password)?;

    if state.store.find_user_by_email(&email).await?.is_some() {
        warn!(%email, "email already registered");
        return Err(ApiError::invalid("Email already registered"));
    }

    let role = registration_role(
        payload.is_admin,
        payload.admin_code.as_deref(),
        &state.config.admin_registration_code,
    )?;

    let password_hash = hash_blocking(payload.password, state.config.bcrypt_cost).await?;
    let user = state
        .store
        .insert_user(NewUser {
            email,
            full_name,
            password_hash,
            role,
        })
        .await?;

    let token = issue_session(&state, &user, false)?;
    info!(user_id = %user.id, role = %user.role, "user registered");
    let message = if role.is_staff() {
        "Admin account created successfully!"
    } else {
        "Account created successfully!"
    };
    Ok((StatusCode::CREATED, Json(TokenResponse::bearer(token, user, message))))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let bad_credentials = || ApiError::Unauthenticated("Incorrect email or password".into());
    let email = payload.email.trim().to_lowercase();

    let Some(user) = state.store.find_user_by_email(&email).await? else {
        warn!(%email, "login unknown email");
        return Err(bad_credentials());
    };
    if !user.is_active {
        warn!(user_id = %user.id, "login on deactivated account");
        return Err(ApiError::Forbidden("Account is deactivated".into()));
    }
    if payload.is_admin && !user.role.is_staff() {
        warn!(user_id = %user.id, "admin login on non-admin account");
        return Err(ApiError::Unauthenticated(
            "Admin login not allowed for this account".into(),
        ));
    }
    if !verify_blocking(payload.password, user.password_hash.clone()).await {
        warn!(user_id = %user.id, "login invalid password");
        return Err(bad_credentials());
    }

    let now = OffsetDateTime::now_utc();
    if let Err(e) = state.store.record_login(user.id, now).await {
        warn!(error = %e, user_id = %user.id, "failed to record last login");
    }

    let token = issue_session(&state, &user, payload.remember_me)?;
    info!(user_id = %user.id, remember_me = payload.remember_me, "user logged in");
    let message = if payload.is_admin {
        "Admin login successful!"
    } else {
        "Login successful!"
    };
    let user = User {
        last_login: Some(now),
        ..user
    };
    Ok(Json(TokenResponse::bearer(token, user, message)))
}

/// Always answers the same way, registered email or not.
#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<ForgotPasswordResponse>, ApiError> {
    let email = payload.email.trim().to_lowercase();

    match state.store.find_user_by_email(&email).await {
        Ok(Some(user)) => {
            let user_id = user.id;
            let token = state
                .tokens
                .issue(&ClaimRequest::password_reset(user.email.clone(), user.role), false)?;
            let mailer = state.mailer.clone();
            tokio::spawn(async move {
                if let Err(e) = mailer
                    .send_password_reset(&user.email, &user.full_name, &token)
                    .await
                {
                    warn!(error = %e, "password reset mail failed");
                }
            });
            info!(%user_id, "password reset mail queued");
        }
        Ok(None) => info!("password reset for unknown email"),
        Err(e) => warn!(error = %e, "password reset lookup failed"),
    }

    Ok(Json(ForgotPasswordResponse {
        message: "If your email is registered, you will receive a reset link",
        email,
    }))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    check_new_password(&payload.new_password, &payload.confirm_password)?;
    let email = reset_subject(&state, &payload.token)?;

    let user = state
        .store
        .find_user_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    let hash = hash_blocking(payload.new_password, state.config.bcrypt_cost).await?;
    state.store.set_password_hash(user.id, &hash).await?;

    info!(user_id = %user.id, "password reset");
    Ok(Json(MessageResponse {
        message: "Password reset successfully",
    }))
}

#[instrument(skip(state, payload))]
pub async fn verify_reset_token(
    State(state): State<AppState>,
    Json(payload): Json<VerifyResetTokenRequest>,
) -> Result<Json<VerifyResetTokenResponse>, ApiError> {
    let token = payload
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::invalid("Token is required"))?;
    let email = reset_subject(&state, &token)?;

    if state.store.find_user_by_email(&email).await?.is_none() {
        return Err(ApiError::not_found("User"));
    }
    Ok(Json(VerifyResetTokenResponse {
        valid: true,
        message: "Token is valid",
        email,
    }))
}

#[instrument(skip(state, caller))]
pub async fn get_me(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<UserResponse>, ApiError> {
    let claims = authorize(caller.claims(), Action::ViewOwnData)?;
    let user = current_user(&state, claims).await?;
    Ok(Json(user.into()))
}
