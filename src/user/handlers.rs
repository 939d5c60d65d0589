use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{debug, info, instrument};

use super::dto::{
    ApplicationStatusResponse, BulkSaveResponse, DataExport, ExportedUser, LimitQuery,
    ProfileCompletion, SearchResponse, Timeline,
};
use crate::{
    auth::{extractors::Caller, services::current_user},
    error::ApiError,
    jobs::{
        dto::{JobQuery, JobResponse},
        repo_types::{ExperienceLevel, JobFilter},
    },
    policy::{authorize, Action},
    profile::dto::ProfileResponse,
    saved_jobs::repo_types::NewSavedJob,
    state::AppState,
    store::{decode_text, encode_text, parse_id},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/user/recommended-jobs", get(recommended_jobs))
        .route("/user/search-jobs", get(search_jobs))
        .route("/user/application-status/:job_id", get(application_status))
        .route("/user/similar-jobs/:job_id", get(similar_jobs))
        .route("/user/profile-completion-status", get(profile_completion))
        .route("/user/activity-timeline", get(activity_timeline))
        .route("/user/export-data", get(export_data))
        .route("/user/bulk-save-jobs", post(bulk_save_jobs))
}

/// Active jobs sharing a skill with the caller's profile. Without skills,
/// falls back to the profile's experience level, then to the newest jobs.
#[instrument(skip(state, caller))]
pub async fn recommended_jobs(
    State(state): State<AppState>,
    caller: Caller,
    Query(q): Query<LimitQuery>,
) -> Result<Json<Vec<JobResponse>>, ApiError> {
    let claims = authorize(caller.claims(), Action::ViewOwnData)?;
    let user = current_user(&state, claims).await?;

    let mut filter = JobFilter {
        limit: q.clamped(10, 50),
        ..Default::default()
    };
    if let Some(profile) = state.store.find_profile_by_user(user.id).await? {
        if !profile.skills.is_empty() {
            filter.skills = profile.skills;
        } else if let Some(exp) = profile.experience.as_deref() {
            filter.experience_level = decode_text::<ExperienceLevel>(&exp.trim().to_lowercase()).ok();
        }
    }
    debug!(skills = filter.skills.len(), "recommending jobs");

    let jobs = state.store.list_jobs(&filter).await?;
    Ok(Json(jobs.into_iter().map(JobResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn search_jobs(
    State(state): State<AppState>,
    Query(q): Query<JobQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let filter = JobFilter::from(q);
    let jobs = state.store.list_jobs(&filter).await?;
    let total = state.store.count_jobs(&filter).await?;
    Ok(Json(SearchResponse::new(
        jobs.into_iter().map(JobResponse::from).collect(),
        total,
        filter.skip,
        filter.limit,
    )))
}

#[instrument(skip(state, caller))]
pub async fn application_status(
    State(state): State<AppState>,
    caller: Caller,
    Path(job_id): Path<String>,
) -> Result<Json<ApplicationStatusResponse>, ApiError> {
    let claims = authorize(caller.claims(), Action::ViewOwnData)?;
    let user = current_user(&state, claims).await?;

    let app = match parse_id(&job_id) {
        Some(id) => state.store.find_application_for(id, user.id).await?,
        None => None,
    };
    Ok(Json(app.into()))
}

#[instrument(skip(state))]
pub async fn similar_jobs(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Query(q): Query<LimitQuery>,
) -> Result<Json<Vec<JobResponse>>, ApiError> {
    let id = parse_id(&job_id).ok_or_else(|| ApiError::invalid("Invalid job ID format"))?;
    let job = state
        .store
        .find_job(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job"))?;
    let similar = state.store.list_similar_jobs(&job, q.clamped(5, 20)).await?;
    Ok(Json(similar.into_iter().map(JobResponse::from).collect()))
}

#[instrument(skip(state, caller))]
pub async fn profile_completion(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<ProfileCompletion>, ApiError> {
    let claims = authorize(caller.claims(), Action::ViewOwnData)?;
    let user = current_user(&state, claims).await?;
    let profile = state.store.find_profile_by_user(user.id).await?;
    Ok(Json(ProfileCompletion::of(profile.as_ref())))
}

#[instrument(skip(state, caller))]
pub async fn activity_timeline(
    State(state): State<AppState>,
    caller: Caller,
    Query(q): Query<LimitQuery>,
) -> Result<Json<Timeline>, ApiError> {
    let claims = authorize(caller.claims(), Action::ViewOwnData)?;
    let user = current_user(&state, claims).await?;

    let applications = state.store.list_applications_by_user(user.id).await?;
    let saved = state.store.list_saved_jobs(user.id).await?;
    let limit = q.clamped(20, 100) as usize;
    Ok(Json(Timeline::merge(applications, saved, limit)))
}

#[instrument(skip(state, caller))]
pub async fn export_data(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<DataExport>, ApiError> {
    let claims = authorize(caller.claims(), Action::ViewOwnData)?;
    let user = current_user(&state, claims).await?;

    let profile = state.store.find_profile_by_user(user.id).await?;
    let applications = state.store.list_applications_by_user(user.id).await?;
    let saved = state.store.list_saved_jobs(user.id).await?;

    info!(user_id = %user.id, "data export");
    Ok(Json(DataExport {
        user: ExportedUser {
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            created_at: user.created_at,
        },
        profile: profile.map(ProfileResponse::from),
        applications: applications.into_iter().map(Into::into).collect(),
        saved_jobs: saved.into_iter().map(Into::into).collect(),
    }))
}

/// Saves every listed job not yet bookmarked. Malformed or unknown ids
/// are skipped.
#[instrument(skip(state, caller, job_ids))]
pub async fn bulk_save_jobs(
    State(state): State<AppState>,
    caller: Caller,
    Json(job_ids): Json<Vec<String>>,
) -> Result<Json<BulkSaveResponse>, ApiError> {
    let claims = authorize(caller.claims(), Action::ViewOwnData)?;
    let user = current_user(&state, claims).await?;

    let mut saved_count = 0;
    for raw in &job_ids {
        let Some(id) = parse_id(raw) else { continue };
        let Some(job) = state.store.find_job(id).await? else { continue };
        let inserted = state
            .store
            .insert_saved_job(NewSavedJob {
                user_id: user.id,
                job_id: job.id,
                job_type: encode_text(&job.job_type)?,
                title: job.title,
                company: job.company,
                location: job.location,
                salary: job.salary,
            })
            .await?;
        if inserted.is_some() {
            saved_count += 1;
        }
    }

    info!(user_id = %user.id, requested = job_ids.len(), saved_count, "bulk save");
    Ok(Json(BulkSaveResponse {
        success: true,
        saved_count,
        message: format!("{saved_count} jobs saved successfully"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applications::repo_types::{ApplicationStatus, NewApplication};
    use crate::auth::claims::Role;
    use crate::auth::repo_types::User;
    use crate::jobs::repo_types::Job;
    use crate::profile::repo_types::ProfileInput;
    use crate::testing::{caller, seed_job, seed_user};
    use crate::user::dto::ActivityKind;
    use uuid::Uuid;

    const BOSS: &str = "boss@example.com";
    const ANN: &str = "ann@example.com";

    async fn apply(state: &AppState, job: &Job, user: &User) {
        state
            .store
            .insert_application(NewApplication {
                job_id: job.id,
                job_title: job.title.clone(),
                job_company: job.company.clone(),
                user_id: user.id,
                user_name: user.full_name.clone(),
                user_email: user.email.clone(),
                user_phone: None,
                cover_letter: String::new(),
                resume_url: None,
                portfolio_url: None,
                linkedin_url: None,
                status: ApplicationStatus::Pending,
            })
            .await
            .unwrap()
            .unwrap();
    }

    async fn seed_profile(state: &AppState, user: &User, skills: &[&str], experience: &str) {
        state
            .store
            .upsert_profile(
                user.id,
                ProfileInput {
                    full_name: "Ann Seeker".into(),
                    email: user.email.clone(),
                    phone: "123".into(),
                    location: "Berlin".into(),
                    experience: Some(experience.into()),
                    skills: skills.iter().map(|s| s.to_string()).collect(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn recommendations_follow_profile_skills() {
        let state = AppState::fake();
        let boss = seed_user(&state, BOSS, Role::Admin).await;
        let ann = seed_user(&state, ANN, Role::JobSeeker).await;
        let rust = seed_job(&state, &boss, &["rust"]).await;
        seed_job(&state, &boss, &["cobol"]).await;

        let Json(all) = recommended_jobs(
            State(state.clone()),
            caller(ANN, Role::JobSeeker),
            Query(LimitQuery::default()),
        )
        .await
        .unwrap();
        assert_eq!(all.len(), 2);

        seed_profile(&state, &ann, &["rust"], "mid").await;
        let Json(picked) = recommended_jobs(
            State(state),
            caller(ANN, Role::JobSeeker),
            Query(LimitQuery::default()),
        )
        .await
        .unwrap();
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].id, rust.id);
    }

    #[tokio::test]
    async fn search_reports_paging() {
        let state = AppState::fake();
        let boss = seed_user(&state, BOSS, Role::Admin).await;
        for _ in 0..3 {
            seed_job(&state, &boss, &[]).await;
        }

        let Json(page) = search_jobs(
            State(state),
            Query(JobQuery {
                search: Some("backend".into()),
                skip: Some(2),
                limit: Some(2),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.jobs.len(), 1);
        assert_eq!((page.page, page.pages), (2, 2));
    }

    #[tokio::test]
    async fn application_status_before_and_after_applying() {
        let state = AppState::fake();
        let boss = seed_user(&state, BOSS, Role::Admin).await;
        let ann = seed_user(&state, ANN, Role::JobSeeker).await;
        let job = seed_job(&state, &boss, &[]).await;

        let Json(before) = application_status(
            State(state.clone()),
            caller(ANN, Role::JobSeeker),
            Path(job.id.to_string()),
        )
        .await
        .unwrap();
        assert!(!before.has_applied);
        assert!(before.application_id.is_none());

        apply(&state, &job, &ann).await;
        let Json(after) = application_status(
            State(state.clone()),
            caller(ANN, Role::JobSeeker),
            Path(job.id.to_string()),
        )
        .await
        .unwrap();
        assert!(after.has_applied);
        assert_eq!(after.status, Some(ApplicationStatus::Pending));

        let Json(garbage) = application_status(
            State(state),
            caller(ANN, Role::JobSeeker),
            Path("not-an-id".into()),
        )
        .await
        .unwrap();
        assert!(!garbage.has_applied);
    }

    #[tokio::test]
    async fn similar_jobs_exclude_the_job_itself() {
        let state = AppState::fake();
        let boss = seed_user(&state, BOSS, Role::Admin).await;
        let job = seed_job(&state, &boss, &["rust"]).await;
        let sibling = seed_job(&state, &boss, &["go"]).await;

        let Json(similar) = similar_jobs(
            State(state.clone()),
            Path(job.id.to_string()),
            Query(LimitQuery::default()),
        )
        .await
        .unwrap();
        assert_eq!(similar.len(), 1);
        assert_eq!(similar[0].id, sibling.id);

        let err = similar_jobs(
            State(state.clone()),
            Path("undefined".into()),
            Query(LimitQuery::default()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(ref m) if m == "Invalid job ID format"));

        let err = similar_jobs(
            State(state),
            Path(Uuid::new_v4().to_string()),
            Query(LimitQuery::default()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn completion_status_tracks_the_profile() {
        let state = AppState::fake();
        let ann = seed_user(&state, ANN, Role::JobSeeker).await;

        let Json(empty) = profile_completion(State(state.clone()), caller(ANN, Role::JobSeeker))
            .await
            .unwrap();
        assert_eq!(empty.percentage, 0);
        assert_eq!(empty.missing_fields.len(), 7);

        seed_profile(&state, &ann, &["rust"], "senior").await;
        let Json(filled) = profile_completion(State(state), caller(ANN, Role::JobSeeker))
            .await
            .unwrap();
        assert_eq!(filled.percentage, 71);
        assert!(filled.completed);
        assert!(!filled.has_cv);
    }

    #[tokio::test]
    async fn timeline_merges_newest_first() {
        let state = AppState::fake();
        let boss = seed_user(&state, BOSS, Role::Admin).await;
        let ann = seed_user(&state, ANN, Role::JobSeeker).await;
        let applied = seed_job(&state, &boss, &[]).await;
        let bookmarked = seed_job(&state, &boss, &[]).await;
        apply(&state, &applied, &ann).await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        bulk_save_jobs(
            State(state.clone()),
            caller(ANN, Role::JobSeeker),
            Json(vec![bookmarked.id.to_string()]),
        )
        .await
        .unwrap();

        let Json(timeline) = activity_timeline(
            State(state.clone()),
            caller(ANN, Role::JobSeeker),
            Query(LimitQuery::default()),
        )
        .await
        .unwrap();
        assert_eq!(timeline.activities.len(), 2);
        assert_eq!(timeline.activities[0].kind, ActivityKind::Saved);
        assert_eq!(timeline.activities[1].status, Some(ApplicationStatus::Pending));

        let Json(one) = activity_timeline(
            State(state),
            caller(ANN, Role::JobSeeker),
            Query(LimitQuery { limit: Some(1) }),
        )
        .await
        .unwrap();
        assert_eq!(one.activities.len(), 1);
    }

    #[tokio::test]
    async fn bulk_save_skips_bad_and_repeated_ids() {
        let state = AppState::fake();
        let boss = seed_user(&state, BOSS, Role::Admin).await;
        let ann = seed_user(&state, ANN, Role::JobSeeker).await;
        let a = seed_job(&state, &boss, &[]).await;
        let b = seed_job(&state, &boss, &[]).await;

        let Json(res) = bulk_save_jobs(
            State(state.clone()),
            caller(ANN, Role::JobSeeker),
            Json(vec![
                a.id.to_string(),
                b.id.to_string(),
                a.id.to_string(),
                "nope".into(),
                Uuid::new_v4().to_string(),
            ]),
        )
        .await
        .unwrap();
        assert_eq!(res.saved_count, 2);
        assert_eq!(res.message, "2 jobs saved successfully");
        assert_eq!(state.store.count_saved_jobs(ann.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn export_collects_everything() {
        let state = AppState::fake();
        let boss = seed_user(&state, BOSS, Role::Admin).await;
        let ann = seed_user(&state, ANN, Role::JobSeeker).await;
        let job = seed_job(&state, &boss, &[]).await;
        apply(&state, &job, &ann).await;
        seed_profile(&state, &ann, &["rust"], "mid").await;

        let Json(export) = export_data(State(state.clone()), caller(ANN, Role::JobSeeker))
            .await
            .unwrap();
        assert_eq!(export.user.email, ANN);
        assert!(export.profile.is_some());
        assert_eq!(export.applications.len(), 1);
        assert_eq!(export.applications[0].company, "Acme");
        assert!(export.saved_jobs.is_empty());

        let err = export_data(State(state), Caller(None)).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated(_)));
    }
}
