use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{
    ApplicantsQuery, ApplicationResponse, ApplicationStats, ApplyRequest, ReviewRequest,
};
use super::repo_types::{ApplicationReview, ApplicationStatus, NewApplication};
use crate::{
    auth::{extractors::Caller, services::current_user},
    error::ApiError,
    jobs::repo_types::JobStatus,
    policy::{authorize, authorize_owned, Action, Ownership},
    state::AppState,
    store::parse_id,
};

pub fn seeker_routes() -> Router<AppState> {
    Router::new()
        .route("/applications/apply", post(apply))
        .route("/applications/my-applications", get(my_applications))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/applications/admin/applicants", get(applicants))
        .route("/applications/admin/stats", get(application_stats))
        .route("/applications/:id/status", put(review))
}

#[instrument(skip(state, caller, payload))]
pub async fn apply(
    State(state): State<AppState>,
    caller: Caller,
    Json(payload): Json<ApplyRequest>,
) -> Result<Json<ApplicationResponse>, ApiError> {
    let claims = authorize(caller.claims(), Action::ApplyForJob)?;
    let user = current_user(&state, claims).await?;

    let job_id = parse_id(&payload.job_id).ok_or_else(|| ApiError::invalid("Invalid job ID"))?;
    let job = state
        .store
        .find_job(job_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job"))?;
    if job.status != JobStatus::Active {
        return Err(ApiError::invalid(
            "This job is not currently accepting applications",
        ));
    }

    let phone = state
        .store
        .find_profile_by_user(user.id)
        .await?
        .map(|p| p.phone)
        .filter(|p| !p.is_empty());

    let application = state
        .store
        .insert_application(NewApplication {
            job_id: job.id,
            job_title: job.title.clone(),
            job_company: job.company.clone(),
            user_id: user.id,
            user_name: user.full_name.clone(),
            user_email: user.email.clone(),
            user_phone: phone,
            cover_letter: payload.cover_letter,
            resume_url: payload.resume_url,
            portfolio_url: payload.portfolio_url,
            linkedin_url: payload.linkedin_url,
            status: ApplicationStatus::Pending,
        })
        .await?;
    let Some(application) = application else {
        warn!(job_id = %job.id, user_id = %user.id, "duplicate application");
        return Err(ApiError::invalid("You have already applied for this job"));
    };

    if let Err(e) = state.store.increment_applications(job.id).await {
        warn!(error = %e, job_id = %job.id, "failed to bump applications count");
    }

    let mailer = state.mailer.clone();
    tokio::spawn(async move {
        if let Err(e) = mailer
            .send_application_confirmation(&user.email, &user.full_name, &job.title, &job.company)
            .await
        {
            warn!(error = %e, "application confirmation mail failed");
        }
    });

    info!(application_id = %application.id, job_id = %application.job_id, "application submitted");
    Ok(Json(application.into()))
}

#[instrument(skip(state, caller))]
pub async fn my_applications(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<ApplicationResponse>>, ApiError> {
    let claims = authorize(caller.claims(), Action::ViewOwnData)?;
    let user = current_user(&state, claims).await?;
    let apps = state.store.list_applications_by_user(user.id).await?;
    Ok(Json(apps.into_iter().map(ApplicationResponse::from).collect()))
}

async fn poster_job_ids(state: &AppState, poster: Uuid) -> Result<Vec<Uuid>, ApiError> {
    let jobs = state.store.list_jobs_by_poster(poster).await?;
    Ok(jobs.into_iter().map(|j| j.id).collect())
}

#[instrument(skip(state, caller))]
pub async fn applicants(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<ApplicantsQuery>,
) -> Result<Json<Vec<ApplicationResponse>>, ApiError> {
    let claims = authorize(caller.claims(), Action::ViewApplicants)?;
    let user = current_user(&state, claims).await?;

    let mut job_ids = poster_job_ids(&state, user.id).await?;
    if let Some(raw) = query.job_id.as_deref().filter(|s| !s.is_empty()) {
        let wanted = parse_id(raw).ok_or_else(|| ApiError::invalid("Invalid job ID"))?;
        job_ids.retain(|id| *id == wanted);
    }
    if job_ids.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let apps = state
        .store
        .list_applications_for_jobs(&job_ids, query.status)
        .await?;
    Ok(Json(apps.into_iter().map(ApplicationResponse::from).collect()))
}

#[instrument(skip(state, caller, payload))]
pub async fn review(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    Json(payload): Json<ReviewRequest>,
) -> Result<Json<ApplicationResponse>, ApiError> {
    let claims = authorize(caller.claims(), Action::ReviewApplication)?;
    let id = parse_id(&id).ok_or_else(|| ApiError::invalid("Invalid application ID"))?;
    let reviewer = current_user(&state, claims).await?;

    let application = state
        .store
        .find_application(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Application"))?;
    let job = state.store.find_job(application.job_id).await?;
    authorize_owned(
        Some(claims),
        Action::ReviewApplication,
        Ownership {
            caller_id: reviewer.id,
            owner_id: job.map(|j| j.posted_by),
        },
    )?;

    let new_status = payload.status;
    let updated = state
        .store
        .review_application(
            id,
            ApplicationReview {
                status: new_status,
                notes: payload.notes,
                reviewed_by: reviewer.email.clone(),
                reviewed_at: OffsetDateTime::now_utc(),
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Application"))?;

    if let Some(status) = new_status {
        match state.store.find_user_by_id(updated.user_id).await {
            Ok(Some(applicant)) => {
                let mailer = state.mailer.clone();
                let (title, company) = (updated.job_title.clone(), updated.job_company.clone());
                tokio::spawn(async move {
                    if let Err(e) = mailer
                        .send_status_update(
                            &applicant.email,
                            &applicant.full_name,
                            &title,
                            &company,
                            status,
                        )
                        .await
                    {
                        warn!(error = %e, "status update mail failed");
                    }
                });
            }
            Ok(None) => warn!(user_id = %updated.user_id, "applicant account is gone"),
            Err(e) => warn!(error = %e, "applicant lookup failed"),
        }
    }

    info!(application_id = %updated.id, status = ?updated.status, "application reviewed");
    Ok(Json(updated.into()))
}

#[instrument(skip(state, caller))]
pub async fn application_stats(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<ApplicationStats>, ApiError> {
    let claims = authorize(caller.claims(), Action::ViewAdminStats)?;
    let user = current_user(&state, claims).await?;

    let job_ids = poster_job_ids(&state, user.id).await?;
    if job_ids.is_empty() {
        return Ok(Json(ApplicationStats::default()));
    }
    let counts = state.store.count_applications_by_status(&job_ids).await?;
    Ok(Json(ApplicationStats::from_counts(&counts)))
}
