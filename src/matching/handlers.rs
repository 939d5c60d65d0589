use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::{debug, instrument};

use super::scorer::{score, MatchResult};
use crate::{
    auth::{extractors::Caller, services::current_user},
    error::ApiError,
    policy::{authorize, Action},
    state::AppState,
    store::parse_id,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/matching/job-match-score/:job_id", get(job_match_score))
}

/// A caller without a profile scores zero before the job is even looked up.
#[instrument(skip(state, caller))]
pub async fn job_match_score(
    State(state): State<AppState>,
    caller: Caller,
    Path(job_id): Path<String>,
) -> Result<Json<MatchResult>, ApiError> {
    let claims = authorize(caller.claims(), Action::ViewOwnData)?;
    let user = current_user(&state, claims).await?;

    let Some(profile) = state.store.find_profile_by_user(user.id).await? else {
        return Ok(Json(score(None, Default::default())));
    };

    let job_id = parse_id(&job_id).ok_or_else(|| ApiError::invalid("Invalid job ID format"))?;
    let job = state
        .store
        .find_job(job_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job"))?;

    let result = score(Some((&profile).into()), (&job).into());
    debug!(job_id = %job.id, score = result.score, "match scored");
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::Role;
    use crate::profile::repo_types::ProfileInput;
    use crate::testing::{caller, seed_job, seed_user};

    fn profile_with(skills: &[&str]) -> ProfileInput {
        ProfileInput {
            full_name: "Ann Seeker".into(),
            email: "ann@example.com".into(),
            phone: "+49 30 1234".into(),
            location: "berlin".into(),
            headline: None,
            about: None,
            education: None,
            experience: None,
            skills: skills.iter().map(|s| s.to_string()).collect(),
            cv_filename: None,
        }
    }

    #[tokio::test]
    async fn scores_against_profile() {
        let state = AppState::fake();
        let boss = seed_user(&state, "boss@example.com", Role::Admin).await;
        let ann = seed_user(&state, "ann@example.com", Role::JobSeeker).await;
        let job = seed_job(&state, &boss, &["python", "react", "sql"]).await;
        state
            .store
            .upsert_profile(ann.id, profile_with(&["python", "sql"]))
            .await
            .unwrap();

        let Json(result) = job_match_score(State(state), caller(&ann.email, Role::JobSeeker), Path(job.id.to_string()))
            .await
            .unwrap();
        // 46.7 from skills plus 10 for "berlin" within "Berlin, Germany".
        assert_eq!(result.score, 56.7);
        assert!(result.location_match);
    }

    #[tokio::test]
    async fn no_profile_short_circuits_bad_ids() {
        let state = AppState::fake();
        let ann = seed_user(&state, "ann@example.com", Role::JobSeeker).await;
        let Json(result) = job_match_score(State(state), caller(&ann.email, Role::JobSeeker), Path("not-an-id".into()))
            .await
            .unwrap();
        assert_eq!(result.score, 0.0);
    }

    #[tokio::test]
    async fn bad_id_with_profile_is_invalid() {
        let state = AppState::fake();
        let ann = seed_user(&state, "ann@example.com", Role::JobSeeker).await;
        state.store.upsert_profile(ann.id, profile_with(&[])).await.unwrap();
        let err = job_match_score(State(state), caller(&ann.email, Role::JobSeeker), Path("not-an-id".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(ref m) if m == "Invalid job ID format"));
    }
}
