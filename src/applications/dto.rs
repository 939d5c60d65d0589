use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{Application, ApplicationStatus};

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub job_id: String,
    #[serde(default)]
    pub cover_letter: String,
    pub resume_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub linkedin_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReviewRequest {
    pub status: Option<ApplicationStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApplicantsQuery {
    #[serde(alias = "status_filter")]
    pub status: Option<ApplicationStatus>,
    pub job_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApplicationResponse {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub job_company: String,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub user_phone: Option<String>,
    pub cover_letter: String,
    pub resume_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub status: ApplicationStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub applied_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub reviewed_at: Option<OffsetDateTime>,
    pub reviewed_by: Option<String>,
    pub notes: Option<String>,
}

impl From<Application> for ApplicationResponse {
    fn from(a: Application) -> Self {
        Self {
            id: a.id,
            job_id: a.job_id,
            job_title: a.job_title,
            job_company: a.job_company,
            user_id: a.user_id,
            user_name: a.user_name,
            user_email: a.user_email,
            user_phone: a.user_phone,
            cover_letter: a.cover_letter,
            resume_url: a.resume_url,
            portfolio_url: a.portfolio_url,
            linkedin_url: a.linkedin_url,
            status: a.status,
            applied_at: a.applied_at,
            reviewed_at: a.reviewed_at,
            reviewed_by: a.reviewed_by,
            notes: a.notes,
        }
    }
}

/// Review-pipeline buckets for a poster's jobs. Shortlisted applications
/// count as reviewed.
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct ApplicationStats {
    pub total_applications: i64,
    pub pending_applications: i64,
    pub reviewed_applications: i64,
    pub accepted_applications: i64,
    pub rejected_applications: i64,
}

impl ApplicationStats {
    pub fn from_counts(counts: &[(ApplicationStatus, i64)]) -> Self {
        let mut stats = Self::default();
        for &(status, n) in counts {
            stats.total_applications += n;
            match status {
                ApplicationStatus::Pending => stats.pending_applications += n,
                ApplicationStatus::Reviewed | ApplicationStatus::Shortlisted => {
                    stats.reviewed_applications += n
                }
                ApplicationStatus::Accepted => stats.accepted_applications += n,
                ApplicationStatus::Rejected => stats.rejected_applications += n,
                ApplicationStatus::Withdrawn => {}
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets() {
        let stats = ApplicationStats::from_counts(&[
            (ApplicationStatus::Pending, 3),
            (ApplicationStatus::Reviewed, 1),
            (ApplicationStatus::Shortlisted, 2),
            (ApplicationStatus::Withdrawn, 1),
        ]);
        assert_eq!(stats.total_applications, 7);
        assert_eq!(stats.pending_applications, 3);
        assert_eq!(stats.reviewed_applications, 3);
        assert_eq!(stats.accepted_applications, 0);
    }

    #[test]
    fn applicants_query_accepts_legacy_name() {
        let q: ApplicantsQuery =
            serde_json::from_value(serde_json::json!({ "status_filter": "pending" })).unwrap();
        assert_eq!(q.status, Some(ApplicationStatus::Pending));
    }
}
