use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use super::dto::{profile_views, AdminDashboard, UserDashboard};
use crate::{
    applications::repo_types::ApplicationStatus,
    auth::{extractors::Caller, services::current_user},
    error::ApiError,
    jobs::repo_types::JobStatus,
    policy::{authorize, Action},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stats/user-dashboard", get(user_dashboard))
        .route("/admin/dashboard-stats", get(admin_dashboard))
}

#[instrument(skip(state, caller))]
pub async fn user_dashboard(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<UserDashboard>, ApiError> {
    let claims = authorize(caller.claims(), Action::ViewOwnData)?;
    let user = current_user(&state, claims).await?;

    let applications_count = state.store.count_applications_by_user(user.id, &[]).await?;
    let saved_jobs_count = state.store.count_saved_jobs(user.id).await?;
    let interviews_count = state
        .store
        .count_applications_by_user(user.id, &[ApplicationStatus::Shortlisted])
        .await?;

    Ok(Json(UserDashboard {
        user_id: user.id,
        applications_count,
        saved_jobs_count,
        interviews_count,
        profile_views: profile_views(user.profile_completed, applications_count),
        profile_completed: user.profile_completed,
    }))
}

#[instrument(skip(state, caller))]
pub async fn admin_dashboard(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<AdminDashboard>, ApiError> {
    let claims = authorize(caller.claims(), Action::ViewAdminStats)?;
    let admin = current_user(&state, claims).await?;

    let total_jobs = state.store.count_jobs_by_poster(admin.id, None).await?;
    let active_jobs = state
        .store
        .count_jobs_by_poster(admin.id, Some(JobStatus::Active))
        .await?;

    let job_ids: Vec<_> = state
        .store
        .list_jobs_by_poster(admin.id)
        .await?
        .into_iter()
        .map(|j| j.id)
        .collect();
    let (pending_applications, unique_applicants) = if job_ids.is_empty() {
        (0, 0)
    } else {
        let pending = state
            .store
            .count_applications_by_status(&job_ids)
            .await?
            .into_iter()
            .filter(|(status, _)| *status == ApplicationStatus::Pending)
            .map(|(_, n)| n)
            .sum::<i64>();
        (pending, state.store.count_unique_applicants(&job_ids).await?)
    };

    Ok(Json(AdminDashboard {
        total_jobs,
        active_jobs,
        pending_applications,
        unique_applicants,
        admin_id: admin.id,
        admin_email: admin.email,
    }))
}
