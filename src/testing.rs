//! Fixtures shared by handler tests.

use crate::auth::claims::{Claims, Role, TokenKind};
use crate::auth::extractors::Caller;
use crate::auth::repo_types::{NewUser, User};
use crate::jobs::repo_types::{Job, JobStatus, JobType, NewJob};
use crate::state::AppState;

pub fn caller(email: &str, role: Role) -> Caller {
    Caller(Some(Claims {
        sub: email.to_string(),
        role,
        iat: 0,
        exp: i64::MAX,
        kind: TokenKind::Access,
    }))
}

pub async fn seed_user(state: &AppState, email: &str, role: Role) -> User {
    state
        .store
        .insert_user(NewUser {
            email: email.to_string(),
            full_name: "Test User".into(),
            password_hash: "unused".into(),
            role,
        })
        .await
        .expect("seed user")
}

pub async fn seed_job(state: &AppState, poster: &User, skills: &[&str]) -> Job {
    state
        .store
        .insert_job(NewJob {
            title: "Backend Engineer".into(),
            company: "Acme".into(),
            location: "Berlin, Germany".into(),
            job_type: JobType::FullTime,
            salary: Some("60k".into()),
            description: "Build APIs".into(),
            requirements: "Experience with services".into(),
            benefits: None,
            skills: skills.iter().map(|s| s.to_string()).collect(),
            status: JobStatus::Active,
            experience_level: None,
            application_deadline: None,
            posted_by: poster.id,
            posted_by_email: poster.email.clone(),
            posted_by_name: poster.full_name.clone(),
        })
        .await
        .expect("seed job")
}
