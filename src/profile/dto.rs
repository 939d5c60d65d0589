use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{Profile, ProfileInput};

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub headline: Option<String>,
    pub about: Option<String>,
    pub education: Option<String>,
    pub experience: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub cv_filename: Option<String>,
}

impl From<ProfileRequest> for ProfileInput {
    fn from(r: ProfileRequest) -> Self {
        Self {
            full_name: r.full_name.trim().to_string(),
            email: r.email.trim().to_lowercase(),
            phone: r.phone.trim().to_string(),
            location: r.location.trim().to_string(),
            headline: r.headline,
            about: r.about,
            education: r.education,
            experience: r.experience,
            skills: r
                .skills
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            cv_filename: r.cv_filename,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
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
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Profile> for ProfileResponse {
    fn from(p: Profile) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            full_name: p.full_name,
            email: p.email,
            phone: p.phone,
            location: p.location,
            headline: p.headline,
            about: p.about,
            education: p.education,
            experience: p.experience,
            skills: p.skills,
            cv_uploaded: p.cv_uploaded,
            cv_filename: p.cv_filename,
            profile_completed: p.profile_completed,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileStatus {
    pub profile_completed: bool,
    pub user_id: Uuid,
    pub email: String,
}
