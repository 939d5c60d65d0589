use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct UserDashboard {
    pub user_id: Uuid,
    pub applications_count: i64,
    pub saved_jobs_count: i64,
    pub interviews_count: i64,
    pub profile_views: i64,
    pub profile_completed: bool,
}

#[derive(Debug, Serialize)]
pub struct AdminDashboard {
    pub total_jobs: i64,
    pub active_jobs: i64,
    pub pending_applications: i64,
    pub unique_applicants: i64,
    pub admin_id: Uuid,
    pub admin_email: String,
}

/// Completed profiles get a baseline of views plus one per application.
pub fn profile_views(profile_completed: bool, applications: i64) -> i64 {
    if profile_completed {
        5 + applications
    } else {
        0
    }
}
