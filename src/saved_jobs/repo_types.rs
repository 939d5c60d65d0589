use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Bookmark of a posting, with a snapshot of its listing fields.
#[derive(Debug, Clone, FromRow)]
pub struct SavedJob {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: String,
    pub salary: Option<String>,
    pub saved_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewSavedJob {
    pub user_id: Uuid,
    pub job_id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: String,
    pub salary: Option<String>,
}
