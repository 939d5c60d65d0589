use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{
    CreateJobRequest, DeleteJobResponse, JobCountResponse, JobQuery, JobResponse, UpdateJobRequest,
};
use super::repo_types::{Job, JobFilter, JobPatch, JobStatus, NewJob};
use crate::{
    auth::{extractors::Caller, services::current_user},
    error::ApiError,
    policy::{authorize, authorize_owned, Action, Ownership},
    state::AppState,
    store::{is_placeholder_id, parse_id},
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/jobs", get(list_jobs))
        .route("/jobs/:id", get(get_job).put(update_job).delete(delete_job))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/jobs/create", post(create_job))
        .route("/jobs/admin/my-jobs", get(my_jobs))
        .route("/jobs/admin/stats/count", get(job_counts))
        .route("/jobs/admin/:id", get(get_job_for_edit))
}

fn require_min_len(value: &str, what: &str) -> Result<String, ApiError> {
    let value = value.trim();
    if value.chars().count() < 2 {
        return Err(ApiError::invalid(format!("{what} must be at least 2 characters")));
    }
    Ok(value.to_string())
}

/// Role gate, id parse, then ownership. A posting owned by someone else is
/// reported exactly like a missing one.
async fn owned_job(
    state: &AppState,
    caller: &Caller,
    action: Action,
    raw_id: &str,
) -> Result<Job, ApiError> {
    let claims = authorize(caller.claims(), action)?;
    let id = parse_id(raw_id).ok_or_else(|| ApiError::invalid("Invalid job ID format"))?;
    let user = current_user(state, claims).await?;
    let job = state.store.find_job(id).await?;
    authorize_owned(
        Some(claims),
        action,
        Ownership {
            caller_id: user.id,
            owner_id: job.as_ref().map(|j| j.posted_by),
        },
    )?;
    job.ok_or_else(|| ApiError::not_found("Job"))
}

#[instrument(skip(state, caller, payload))]
pub async fn create_job(
    State(state): State<AppState>,
    caller: Caller,
    Json(payload): Json<CreateJobRequest>,
) -> Result<Json<JobResponse>, ApiError> {
    let claims = authorize(caller.claims(), Action::CreateJob)?;
    let title = require_min_len(&payload.title, "Job title")?;
    let company = require_min_len(&payload.company, "Company name")?;
    let location = require_min_len(&payload.location, "Location")?;
    let poster = current_user(&state, claims).await?;

    let job = state
        .store
        .insert_job(NewJob {
            title,
            company,
            location,
            job_type: payload.job_type,
            salary: payload.salary,
            description: payload.description,
            requirements: payload.requirements,
            benefits: payload.benefits,
            skills: payload.skills,
            status: payload.status,
            experience_level: payload.experience_level,
            application_deadline: payload.application_deadline,
            posted_by: poster.id,
            posted_by_email: poster.email,
            posted_by_name: poster.full_name,
        })
        .await?;

    info!(job_id = %job.id, posted_by = %job.posted_by, "job created");
    Ok(Json(job.into()))
}

#[instrument(skip(state))]
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobQuery>,
) -> Result<Json<Vec<JobResponse>>, ApiError> {
    let filter = JobFilter::from(query);
    let jobs = state.store.list_jobs(&filter).await?;
    Ok(Json(jobs.into_iter().map(JobResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobResponse>, ApiError> {
    if is_placeholder_id(&id) {
        return Err(ApiError::invalid("Job ID is required"));
    }
    let Some(id) = parse_id(&id) else {
        return Err(ApiError::not_found("Job"));
    };
    let job = state
        .store
        .find_job(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job"))?;
    Ok(Json(job.into()))
}

#[instrument(skip(state, caller))]
pub async fn my_jobs(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<JobResponse>>, ApiError> {
    let claims = authorize(caller.claims(), Action::ListOwnJobs)?;
    let user = current_user(&state, claims).await?;
    let jobs = state.store.list_jobs_by_poster(user.id).await?;
    Ok(Json(jobs.into_iter().map(JobResponse::from).collect()))
}

#[instrument(skip(state, caller))]
pub async fn job_counts(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<JobCountResponse>, ApiError> {
    let claims = authorize(caller.claims(), Action::ListOwnJobs)?;
    let user = current_user(&state, claims).await?;
    Ok(Json(JobCountResponse {
        total_jobs: state.store.count_jobs_by_poster(user.id, None).await?,
        active_jobs: state
            .store
            .count_jobs_by_poster(user.id, Some(JobStatus::Active))
            .await?,
    }))
}

#[instrument(skip(state, caller))]
pub async fn get_job_for_edit(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<JobResponse>, ApiError> {
    let job = owned_job(&state, &caller, Action::ViewJobForEdit, &id).await?;
    Ok(Json(job.into()))
}

#[instrument(skip(state, caller, payload))]
pub async fn update_job(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    Json(payload): Json<UpdateJobRequest>,
) -> Result<Json<JobResponse>, ApiError> {
    let job = owned_job(&state, &caller, Action::UpdateJob, &id).await?;

    let patch = JobPatch::from(payload);
    if let Some(title) = &patch.title {
        require_min_len(title, "Job title")?;
    }
    if let Some(company) = &patch.company {
        require_min_len(company, "Company name")?;
    }
    if let Some(location) = &patch.location {
        require_min_len(location, "Location")?;
    }

    let updated = state
        .store
        .update_job(job.id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("Job"))?;
    info!(job_id = %updated.id, "job updated");
    Ok(Json(updated.into()))
}

#[instrument(skip(state, caller))]
pub async fn delete_job(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<DeleteJobResponse>, ApiError> {
    let job = owned_job(&state, &caller, Action::DeleteJob, &id).await?;
    if !state.store.delete_job(job.id).await? {
        return Err(ApiError::not_found("Job"));
    }
    info!(job_id = %job.id, "job deleted");
    Ok(Json(DeleteJobResponse {
        message: "Job deleted successfully",
        job_id: job.id,
    }))
}
