use std::str::FromStr;

use anyhow::Context;
use jsonwebtoken::Algorithm;
use serde::Deserialize;

/// Lifetime of a "remember me" session.
pub const EXTENDED_TTL_MINUTES: i64 = 60 * 24 * 7;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: String,
    pub ttl_minutes: i64,
}

impl JwtConfig {
    /// Only HMAC algorithms are usable with a shared secret.
    pub fn algorithm(&self) -> anyhow::Result<Algorithm> {
        let alg = Algorithm::from_str(&self.algorithm)
            .with_context(|| format!("unknown JWT algorithm {}", self.algorithm))?;
        match alg {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(alg),
            other => anyhow::bail!("JWT algorithm {:?} needs a key pair, not a secret", other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub admin_registration_code: String,
    pub bcrypt_cost: u32,
    pub frontend_url: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let store_backend = match std::env::var("STORE_BACKEND") {
            Ok(v) if v.eq_ignore_ascii_case("memory") => StoreBackend::Memory,
            Ok(v) if v.eq_ignore_ascii_case("postgres") => StoreBackend::Postgres,
            Ok(v) => anyhow::bail!("unsupported STORE_BACKEND {v}"),
            Err(_) => StoreBackend::Postgres,
        };
        let database_url = match store_backend {
            StoreBackend::Postgres => {
                Some(std::env::var("DATABASE_URL").context("DATABASE_URL is required")?)
            }
            StoreBackend::Memory => std::env::var("DATABASE_URL").ok(),
        };
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is required")?,
            algorithm: std::env::var("JWT_ALGORITHM").unwrap_or_else(|_| "HS256".into()),
            ttl_minutes: env_parsed("ACCESS_TOKEN_EXPIRE_MINUTES", 60 * 24)?,
        };
        let bcrypt_cost = env_parsed("BCRYPT_COST", 12)?;

        let config = Self {
            store_backend,
            database_url,
            jwt,
            admin_registration_code: std::env::var("ADMIN_REGISTRATION_CODE")
                .unwrap_or_else(|_| "ADMIN2024".into()),
            bcrypt_cost,
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Misconfiguration is fatal at startup rather than per request.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.jwt.secret.is_empty(), "JWT_SECRET must not be empty");
        anyhow::ensure!(self.jwt.ttl_minutes > 0, "ACCESS_TOKEN_EXPIRE_MINUTES must be positive");
        anyhow::ensure!(
            (4..=31).contains(&self.bcrypt_cost),
            "BCRYPT_COST must be between 4 and 31"
        );
        self.jwt.algorithm()?;
        Ok(())
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            store_backend: StoreBackend::Memory,
            database_url: None,
            jwt: JwtConfig {
                secret: "test-secret".into(),
                algorithm: "HS256".into(),
                ttl_minutes: 30,
            },
            admin_registration_code: "ADMIN2024".into(),
            bcrypt_cost: 4,
            frontend_url: "http://localhost:3000".into(),
        }
    }
}

fn env_parsed<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_or(name, std::env::var(name).ok().as_deref(), default)
}

/// An unset variable takes the default; a set but unparseable one is an error.
fn parse_or<T>(name: &str, raw: Option<&str>, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.map(|v| v.trim().parse::<T>())
        .transpose()
        .with_context(|| format!("{name} must be an integer"))
        .map(|v| v.unwrap_or(default))
}
