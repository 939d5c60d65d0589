use std::convert::Infallible;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::debug;

use super::claims::{Claims, TokenKind};
use crate::state::AppState;

/// Session claims of the caller, if any.
///
/// Never rejects: a missing, malformed or expired bearer token yields
/// `None`, and the access guard turns that into 401. Password-reset tokens
/// are only good for the reset endpoints and never authenticate here.
pub struct Caller(pub Option<Claims>);

impl Caller {
    pub fn claims(&self) -> Option<&Claims> {
        self.0.as_ref()
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            debug!("no bearer token");
            return Ok(Caller(None));
        };
        let claims = state
            .tokens
            .verify(token)
            .filter(|c| c.kind == TokenKind::Access);
        Ok(Caller(claims))
    }
}
