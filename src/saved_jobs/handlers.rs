use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{
    SaveJobRequest, SavedCheckResponse, SavedCountResponse, SavedJobResponse, UnsaveResponse,
};
use super::repo_types::NewSavedJob;
use crate::{
    auth::{extractors::Caller, services::current_user},
    error::ApiError,
    policy::{authorize, Action},
    state::AppState,
    store::{encode_text, parse_id},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/saved-jobs", get(list_saved).post(save_job))
        .route("/saved-jobs/count", get(count_saved))
        .route("/saved-jobs/check/:job_id", get(check_saved))
        .route("/saved-jobs/:job_id", delete(unsave_job))
}

#[instrument(skip(state, caller))]
pub async fn list_saved(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<SavedJobResponse>>, ApiError> {
    let claims = authorize(caller.claims(), Action::ViewOwnData)?;
    let user = current_user(&state, claims).await?;
    let saved = state.store.list_saved_jobs(user.id).await?;
    Ok(Json(saved.into_iter().map(SavedJobResponse::from).collect()))
}

/// Idempotent: a second save hands back the existing bookmark.
#[instrument(skip(state, caller, payload))]
pub async fn save_job(
    State(state): State<AppState>,
    caller: Caller,
    Json(payload): Json<SaveJobRequest>,
) -> Result<Json<SavedJobResponse>, ApiError> {
    let claims = authorize(caller.claims(), Action::ViewOwnData)?;
    let user = current_user(&state, claims).await?;

    let job_id = parse_id(&payload.job_id).ok_or_else(|| ApiError::invalid("Invalid job ID"))?;
    if let Some(existing) = state.store.find_saved_job(user.id, job_id).await? {
        return Ok(Json(existing.into()));
    }

    let job = state
        .store
        .find_job(job_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job"))?;

    let job_type = match payload.job_type {
        Some(t) => t,
        None => encode_text(&job.job_type)?,
    };
    let saved = state
        .store
        .insert_saved_job(NewSavedJob {
            user_id: user.id,
            job_id: job.id,
            title: payload.title.unwrap_or(job.title),
            company: payload.company.unwrap_or(job.company),
            location: payload.location.unwrap_or(job.location),
            job_type,
            salary: payload.salary.or(job.salary),
        })
        .await?;
    let saved = match saved {
        Some(saved) => saved,
        // Lost a race with a concurrent save of the same job.
        None => state
            .store
            .find_saved_job(user.id, job_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Saved job"))?,
    };

    info!(user_id = %user.id, job_id = %saved.job_id, "job saved");
    Ok(Json(saved.into()))
}

#[instrument(skip(state, caller))]
pub async fn unsave_job(
    State(state): State<AppState>,
    caller: Caller,
    Path(job_id): Path<String>,
) -> Result<Json<UnsaveResponse>, ApiError> {
    let claims = authorize(caller.claims(), Action::ViewOwnData)?;
    let user = current_user(&state, claims).await?;

    let removed = match parse_id(&job_id) {
        Some(id) => state.store.delete_saved_job(user.id, id).await?,
        None => 0,
    };
    if removed == 0 {
        return Err(ApiError::not_found("Saved job"));
    }
    Ok(Json(UnsaveResponse {
        success: true,
        message: "Job removed from saved jobs".into(),
        deleted_count: removed,
    }))
}

#[instrument(skip(state, caller))]
pub async fn check_saved(
    State(state): State<AppState>,
    caller: Caller,
    Path(job_id): Path<String>,
) -> Result<Json<SavedCheckResponse>, ApiError> {
    let claims = authorize(caller.claims(), Action::ViewOwnData)?;
    let user = current_user(&state, claims).await?;

    let is_saved = match parse_id(&job_id) {
        Some(id) => state.store.find_saved_job(user.id, id).await?.is_some(),
        None => false,
    };
    Ok(Json(SavedCheckResponse { is_saved, job_id }))
}

#[instrument(skip(state, caller))]
pub async fn count_saved(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<SavedCountResponse>, ApiError> {
    let claims = authorize(caller.claims(), Action::ViewOwnData)?;
    let user = current_user(&state, claims).await?;
    let count = state.store.count_saved_jobs(user.id).await?;
    Ok(Json(SavedCountResponse { count }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::Role;
    use crate::testing::{caller, seed_job, seed_user};

    const BOSS: &str = "boss@example.com";
    const ANN: &str = "ann@example.com";

    fn save_body(job_id: String) -> SaveJobRequest {
        SaveJobRequest {
            job_id,
            title: None,
            company: None,
            location: None,
            job_type: None,
            salary: None,
        }
    }

    #[tokio::test]
    async fn save_twice_keeps_one_bookmark() {
        let state = AppState::fake();
        let boss = seed_user(&state, BOSS, Role::Admin).await;
        seed_user(&state, ANN, Role::JobSeeker).await;
        let job = seed_job(&state, &boss, &[]).await;

        let Json(first) = save_job(State(state.clone()), caller(ANN, Role::JobSeeker), Json(save_body(job.id.to_string())))
            .await
            .unwrap();
        assert_eq!(first.title, "Backend Engineer");
        assert_eq!(first.job_type, "Full-Time");

        let Json(second) = save_job(State(state.clone()), caller(ANN, Role::JobSeeker), Json(save_body(job.id.to_string())))
            .await
            .unwrap();
        assert_eq!(first.id, second.id);

        let Json(count) = count_saved(State(state.clone()), caller(ANN, Role::JobSeeker))
            .await
            .unwrap();
        assert_eq!(count.count, 1);

        let Json(check) = check_saved(State(state), caller(ANN, Role::JobSeeker), Path(job.id.to_string()))
            .await
            .unwrap();
        assert!(check.is_saved);
    }

    #[tokio::test]
    async fn concurrent_saves_share_one_bookmark() {
        let state = AppState::fake();
        let boss = seed_user(&state, BOSS, Role::Admin).await;
        seed_user(&state, ANN, Role::JobSeeker).await;
        let job = seed_job(&state, &boss, &[]).await;

        let (a, b) = tokio::join!(
            save_job(State(state.clone()), caller(ANN, Role::JobSeeker), Json(save_body(job.id.to_string()))),
            save_job(State(state.clone()), caller(ANN, Role::JobSeeker), Json(save_body(job.id.to_string()))),
        );
        let (Json(a), Json(b)) = (a.unwrap(), b.unwrap());
        assert_eq!(a.id, b.id);
        assert_eq!(state.store.count_saved_jobs(a.user_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn saving_a_missing_job_is_not_found() {
        let state = AppState::fake();
        seed_user(&state, ANN, Role::JobSeeker).await;
        let err = save_job(
            State(state.clone()),
            caller(ANN, Role::JobSeeker),
            Json(save_body(uuid::Uuid::new_v4().to_string())),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err = save_job(State(state), caller(ANN, Role::JobSeeker), Json(save_body("nope".into())))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn unsave_then_unsave_again() {
        let state = AppState::fake();
        let boss = seed_user(&state, BOSS, Role::Admin).await;
        seed_user(&state, ANN, Role::JobSeeker).await;
        let job = seed_job(&state, &boss, &[]).await;
        save_job(State(state.clone()), caller(ANN, Role::JobSeeker), Json(save_body(job.id.to_string())))
            .await
            .unwrap();

        let Json(removed) = unsave_job(State(state.clone()), caller(ANN, Role::JobSeeker), Path(job.id.to_string()))
            .await
            .unwrap();
        assert!(removed.success);
        assert_eq!(removed.deleted_count, 1);
        let err = unsave_job(State(state.clone()), caller(ANN, Role::JobSeeker), Path(job.id.to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(ref m) if m == "Saved job not found"));

        let Json(check) = check_saved(State(state), caller(ANN, Role::JobSeeker), Path("garbage".into()))
            .await
            .unwrap();
        assert!(!check.is_saved);
        assert_eq!(check.job_id, "garbage");
    }
}
