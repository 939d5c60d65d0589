use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::SavedJob;

/// Listing fields are optional; missing ones are copied from the posting.
#[derive(Debug, Deserialize)]
pub struct SaveJobRequest {
    pub job_id: String,
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<String>,
    pub salary: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SavedJobResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub salary: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub saved_at: OffsetDateTime,
}

impl From<SavedJob> for SavedJobResponse {
    fn from(s: SavedJob) -> Self {
        Self {
            id: s.id,
            user_id: s.user_id,
            job_id: s.job_id,
            title: s.title,
            company: s.company,
            location: s.location,
            job_type: s.job_type,
            salary: s.salary,
            saved_at: s.saved_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SavedCheckResponse {
    pub is_saved: bool,
    /// Echoed as sent.
    pub job_id: String,
}

#[derive(Debug, Serialize)]
pub struct SavedCountResponse {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct UnsaveResponse {
    pub success: bool,
    pub message: String,
    pub deleted_count: u64,
}
