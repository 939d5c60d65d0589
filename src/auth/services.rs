use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

use super::claims::{ClaimRequest, Claims};
use super::password::{hash_password, verify_password};
use super::repo_types::User;
use crate::error::ApiError;
use crate::state::AppState;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_NAME_LEN: usize = 2;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex compiles");
    }
    EMAIL_RE.is_match(email)
}

/// Emails are stored lower-cased; every lookup goes through here.
pub(crate) fn normalize_email(raw: &str) -> Result<String, ApiError> {
    let email = raw.trim().to_lowercase();
    if !is_valid_email(&email) {
        warn!(%email, "invalid email");
        return Err(ApiError::invalid("Invalid email"));
    }
    Ok(email)
}

pub(crate) fn check_new_password(password: &str, confirm: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::invalid("Password must be at least 6 characters"));
    }
    if password != confirm {
        return Err(ApiError::invalid("Passwords do not match"));
    }
    Ok(())
}

pub(crate) fn check_full_name(raw: &str) -> Result<String, ApiError> {
    let name = raw.trim();
    if name.chars().count() < MIN_NAME_LEN {
        return Err(ApiError::invalid("Full name must be at least 2 characters"));
    }
    Ok(name.to_string())
}

/// bcrypt is CPU-bound; both directions run on the blocking pool.
pub(crate) async fn hash_blocking(plain: String, cost: u32) -> Result<String, ApiError> {
    let hash = tokio::task::spawn_blocking(move || hash_password(&plain, cost))
        .await
        .map_err(|e| anyhow::anyhow!("hash task failed: {e}"))??;
    Ok(hash)
}

pub(crate) async fn verify_blocking(plain: String, hash: String) -> bool {
    match tokio::task::spawn_blocking(move || verify_password(&plain, &hash)).await {
        Ok(ok) => ok,
        Err(e) => {
            warn!(error = %e, "verify task failed");
            false
        }
    }
}

/// Loads the account behind already-authorized claims.
pub(crate) async fn current_user(state: &AppState, claims: &Claims) -> Result<User, ApiError> {
    state
        .store
        .find_user_by_email(&claims.sub)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))
}

pub(crate) fn issue_session(state: &AppState, user: &User, extended: bool) -> Result<String, ApiError> {
    let token = state
        .tokens
        .issue(&ClaimRequest::access(user.email.clone(), user.role), extended)?;
    Ok(token)
}

/// Subject of a token presented to the reset endpoints. Both reset and
/// access tokens are honoured there.
pub(crate) fn reset_subject(state: &AppState, token: &str) -> Result<String, ApiError> {
    let claims = state
        .tokens
        .verify(token)
        .ok_or_else(|| ApiError::invalid("Invalid or expired token"))?;
    if claims.sub.is_empty() {
        return Err(ApiError::invalid("Invalid token"));
    }
    Ok(claims.sub)
}
