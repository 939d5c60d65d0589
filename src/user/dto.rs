use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::applications::repo_types::{Application, ApplicationStatus};
use crate::auth::claims::Role;
use crate::jobs::dto::JobResponse;
use crate::profile::dto::ProfileResponse;
use crate::profile::repo_types::Profile;
use crate::saved_jobs::repo_types::SavedJob;

/// `?limit=` on the per-user listings. Out-of-range values are clamped.
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

impl LimitQuery {
    pub fn clamped(&self, default: i64, max: i64) -> i64 {
        self.limit.unwrap_or(default).clamp(1, max)
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub jobs: Vec<JobResponse>,
    pub total: i64,
    pub page: i64,
    pub pages: i64,
}

impl SearchResponse {
    pub fn new(jobs: Vec<JobResponse>, total: i64, skip: i64, limit: i64) -> Self {
        Self {
            jobs,
            total,
            page: skip / limit + 1,
            pages: (total + limit - 1) / limit,
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct ApplicationStatusResponse {
    pub has_applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ApplicationStatus>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub applied_at: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<Uuid>,
}

impl From<Option<Application>> for ApplicationStatusResponse {
    fn from(app: Option<Application>) -> Self {
        match app {
            Some(a) => Self {
                has_applied: true,
                status: Some(a.status),
                applied_at: Some(a.applied_at),
                application_id: Some(a.id),
            },
            None => Self::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Application,
    Saved,
}

#[derive(Debug, Serialize)]
pub struct Activity {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub job_title: String,
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ApplicationStatus>,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub id: Uuid,
}

impl From<Application> for Activity {
    fn from(a: Application) -> Self {
        Self {
            kind: ActivityKind::Application,
            job_title: a.job_title,
            company: a.job_company,
            status: Some(a.status),
            date: a.applied_at,
            id: a.id,
        }
    }
}

impl From<SavedJob> for Activity {
    fn from(s: SavedJob) -> Self {
        Self {
            kind: ActivityKind::Saved,
            job_title: s.title,
            company: s.company,
            status: None,
            date: s.saved_at,
            id: s.id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Timeline {
    pub activities: Vec<Activity>,
}

impl Timeline {
    /// Merges both activity streams, newest first, keeping at most `limit`.
    pub fn merge(applications: Vec<Application>, saved: Vec<SavedJob>, limit: usize) -> Self {
        let mut activities: Vec<Activity> = applications
            .into_iter()
            .map(Activity::from)
            .chain(saved.into_iter().map(Activity::from))
            .collect();
        activities.sort_by(|a, b| b.date.cmp(&a.date));
        activities.truncate(limit);
        Self { activities }
    }
}

const COMPLETION_FIELDS: [&str; 7] = [
    "full_name",
    "phone",
    "location",
    "experience",
    "education",
    "skills",
    "about",
];

/// Share of the required profile fields that are filled in.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ProfileCompletion {
    pub completed: bool,
    pub percentage: u32,
    pub completed_fields: Vec<&'static str>,
    pub missing_fields: Vec<&'static str>,
    pub has_cv: bool,
}

impl ProfileCompletion {
    pub fn of(profile: Option<&Profile>) -> Self {
        let Some(p) = profile else {
            return Self {
                completed: false,
                percentage: 0,
                completed_fields: Vec::new(),
                missing_fields: COMPLETION_FIELDS.to_vec(),
                has_cv: false,
            };
        };
        let filled = |s: Option<&str>| s.is_some_and(|v| !v.trim().is_empty());
        let (completed_fields, missing_fields): (Vec<&'static str>, Vec<&'static str>) =
            COMPLETION_FIELDS.into_iter().partition(|field| match *field {
                "full_name" => filled(Some(p.full_name.as_str())),
                "phone" => filled(Some(p.phone.as_str())),
                "location" => filled(Some(p.location.as_str())),
                "experience" => filled(p.experience.as_deref()),
                "education" => filled(p.education.as_deref()),
                "skills" => !p.skills.is_empty(),
                _ => filled(p.about.as_deref()),
            });
        let percentage = (completed_fields.len() * 100 / COMPLETION_FIELDS.len()) as u32;
        Self {
            completed: percentage >= 70,
            percentage,
            completed_fields,
            missing_fields,
            has_cv: p.cv_uploaded,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExportedUser {
    pub email: String,
    pub full_name: String,
    pub role: Role,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct ExportedApplication {
    pub job_title: String,
    pub company: String,
    pub status: ApplicationStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub applied_at: OffsetDateTime,
}

impl From<Application> for ExportedApplication {
    fn from(a: Application) -> Self {
        Self {
            job_title: a.job_title,
            company: a.job_company,
            status: a.status,
            applied_at: a.applied_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExportedSavedJob {
    pub title: String,
    pub company: String,
    #[serde(with = "time::serde::rfc3339")]
    pub saved_at: OffsetDateTime,
}

impl From<SavedJob> for ExportedSavedJob {
    fn from(s: SavedJob) -> Self {
        Self {
            title: s.title,
            company: s.company,
            saved_at: s.saved_at,
        }
    }
}

/// Everything stored about the caller.
#[derive(Debug, Serialize)]
pub struct DataExport {
    pub user: ExportedUser,
    pub profile: Option<ProfileResponse>,
    pub applications: Vec<ExportedApplication>,
    pub saved_jobs: Vec<ExportedSavedJob>,
}

#[derive(Debug, Serialize)]
pub struct BulkSaveResponse {
    pub success: bool,
    pub saved_count: usize,
    pub message: String,
}
