use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Account role. Stored and signed as its snake_case name.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    JobSeeker,
    Employer,
    Admin,
    Moderator,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::JobSeeker => "job_seeker",
            Role::Employer => "employer",
            Role::Admin => "admin",
            Role::Moderator => "moderator",
        }
    }

    /// Admins and moderators share the back-office permissions.
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Admin | Role::Moderator)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "job_seeker" => Ok(Role::JobSeeker),
            "employer" => Ok(Role::Employer),
            "admin" => Ok(Role::Admin),
            "moderator" => Ok(Role::Moderator),
            other => anyhow::bail!("unknown role {other}"),
        }
    }
}

/// Type of JWT: session access or password reset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    #[default]
    Access,
    PasswordReset,
}

/// JWT payload. Field names are part of the wire contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,      // user email
    pub role: Role,
    pub iat: i64,         // issued at (unix timestamp)
    pub exp: i64,         // expires at (unix timestamp)
    #[serde(rename = "type")]
    pub kind: TokenKind,
}

/// What the caller asks the codec to sign.
#[derive(Debug, Clone)]
pub struct ClaimRequest {
    pub subject: String,
    pub role: Role,
    pub kind: Option<TokenKind>,
}

impl ClaimRequest {
    pub fn access(subject: impl Into<String>, role: Role) -> Self {
        Self {
            subject: subject.into(),
            role,
            kind: None,
        }
    }

    pub fn password_reset(subject: impl Into<String>, role: Role) -> Self {
        Self {
            subject: subject.into(),
            role,
            kind: Some(TokenKind::PasswordReset),
        }
    }
}
