use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Candidate profile, one per user.
#[derive(Debug, Clone, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub headline: Option<String>,
    pub about: Option<String>,
    pub education: Option<String>,
    pub experience: Option<String>,
    pub skills: Vec<String>,
    pub cv_uploaded: bool,
    pub cv_filename: Option<String>,
    pub profile_completed: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Fields written by the owner. Absent optional fields keep their
/// previous value on update.
#[derive(Debug, Clone, Default)]
pub struct ProfileInput {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub headline: Option<String>,
    pub about: Option<String>,
    pub education: Option<String>,
    pub experience: Option<String>,
    pub skills: Vec<String>,
    pub cv_filename: Option<String>,
}
