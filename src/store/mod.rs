use std::sync::Arc;

use anyhow::Context;
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::applications::repo::ApplicationRepo;
use crate::auth::repo::UserRepo;
use crate::config::{AppConfig, StoreBackend};
use crate::jobs::repo::JobRepo;
use crate::profile::repo::ProfileRepo;
use crate::saved_jobs::repo::SavedJobRepo;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Everything the handlers need from persistence.
pub trait Store: UserRepo + ProfileRepo + JobRepo + ApplicationRepo + SavedJobRepo {}

impl<T> Store for T where T: UserRepo + ProfileRepo + JobRepo + ApplicationRepo + SavedJobRepo {}

pub async fn connect(config: &AppConfig) -> anyhow::Result<Arc<dyn Store>> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres store")?;
            let store = PgStore::connect(url).await?;
            store.migrate().await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store; data is lost on restart");
            Ok(Arc::new(MemoryStore::default()))
        }
    }
}

/// Identifiers arrive as path or body strings; anything that is not a UUID
/// simply has no match.
pub fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

/// Enum columns are stored as their serde name.
/// Values a client sends when it has no id at all.
pub fn is_placeholder_id(raw: &str) -> bool {
    let raw = raw.trim();
    raw.is_empty() || ["undefined", "null", "none"].iter().any(|p| raw.eq_ignore_ascii_case(p))
}

pub(crate) fn encode_text<T: Serialize>(value: &T) -> anyhow::Result<String> {
    match serde_json::to_value(value)? {
        serde_json::Value::String(s) => Ok(s),
        other => anyhow::bail!("expected a string-like enum, got {other}"),
    }
}

pub(crate) fn decode_text<T: DeserializeOwned>(raw: &str) -> anyhow::Result<T> {
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .with_context(|| format!("unexpected stored value {raw:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::repo_types::JobType;

    #[test]
    fn parse_id_accepts_uuids_only() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()), Some(id));
        assert_eq!(parse_id(&format!(" {id} ")), Some(id));
        assert_eq!(parse_id("undefined"), None);
        assert_eq!(parse_id(""), None);
        assert_eq!(parse_id("64b7f0c2e4b0a1a2b3c4d5e6"), None);
    }

    #[test]
    fn placeholder_ids() {
        assert!(is_placeholder_id("undefined"));
        assert!(is_placeholder_id("NULL"));
        assert!(is_placeholder_id(" "));
        assert!(!is_placeholder_id("64b7f0c2e4b0a1a2b3c4d5e6"));
    }

    #[test]
    fn enum_text_roundtrip() {
        assert_eq!(encode_text(&JobType::FullTime).unwrap(), "Full-Time");
        let back: JobType = decode_text("Part-Time").unwrap();
        assert_eq!(back, JobType::PartTime);
        assert!(decode_text::<JobType>("Gig").is_err());
    }
}
