use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};

use super::claims::{ClaimRequest, Claims};
use crate::config::{JwtConfig, EXTENDED_TTL_MINUTES};

/// Signs and verifies session tokens with the server secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    ttl: Duration,
    extended_ttl: Duration,
}

impl TokenCodec {
    pub fn new(cfg: &JwtConfig) -> anyhow::Result<Self> {
        Ok(Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            algorithm: cfg.algorithm()?,
            ttl: Duration::minutes(cfg.ttl_minutes),
            extended_ttl: Duration::minutes(EXTENDED_TTL_MINUTES),
        })
    }

    pub fn issue(&self, request: &ClaimRequest, extended: bool) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let ttl = if extended { self.extended_ttl } else { self.ttl };
        let claims = Claims {
            sub: request.subject.clone(),
            role: request.role,
            iat: now.unix_timestamp(),
            exp: (now + ttl).unix_timestamp(),
            kind: request.kind.unwrap_or_default(),
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding)?;
        debug!(sub = %claims.sub, kind = ?claims.kind, extended, "jwt signed");
        Ok(token)
    }

    /// Returns `None` for malformed, forged or expired tokens.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => {
                debug!(sub = %data.claims.sub, kind = ?data.claims.kind, "jwt verified");
                Some(data.claims)
            }
            Err(e) => {
                warn!(error = %e, "token rejected");
                None
            }
        }
    }
}
