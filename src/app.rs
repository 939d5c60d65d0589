use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::{applications, auth, jobs, matching, profile, saved_jobs, stats, user};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api",
            Router::new()
                .merge(auth::router())
                .merge(profile::router())
                .merge(jobs::router())
                .merge(applications::router())
                .merge(saved_jobs::router())
                .merge(stats::router())
                .merge(matching::router())
                .merge(user::router()),
        )
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::{ClaimRequest, Role};
    use crate::testing::{seed_job, seed_user};
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn call(
        app: Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn access_token(state: &AppState, email: &str, role: Role) -> String {
        state
            .tokens
            .issue(&ClaimRequest::access(email, role), false)
            .unwrap()
    }

    #[tokio::test]
    async fn health_is_outside_the_api_prefix() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn admin_signup_with_wrong_code_is_rejected() {
        let app = build_app(AppState::fake());
        let (status, body) = call(
            app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "full_name": "Eve Admin",
                "email": "eve@example.com",
                "password": "secret1",
                "confirm_password": "secret1",
                "is_admin": true,
                "admin_code": "WRONG"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Invalid admin registration code");
    }

    #[tokio::test]
    async fn seeker_cannot_post_jobs() {
        let state = AppState::fake();
        seed_user(&state, "ann@example.com", Role::JobSeeker).await;
        let token = access_token(&state, "ann@example.com", Role::JobSeeker);
        let (status, body) = call(
            build_app(state),
            Method::POST,
            "/api/jobs/create",
            Some(&token),
            Some(json!({
                "title": "Intern",
                "company": "Acme",
                "location": "Remote",
                "type": "Internship",
                "description": "Learn things",
                "requirements": "Curiosity"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["detail"], "Only admins can create jobs");
    }

    #[tokio::test]
    async fn reset_token_does_not_authenticate() {
        let state = AppState::fake();
        seed_user(&state, "ann@example.com", Role::JobSeeker).await;
        let token = state
            .tokens
            .issue(&ClaimRequest::password_reset("ann@example.com", Role::JobSeeker), false)
            .unwrap();
        let (status, _) = call(build_app(state), Method::GET, "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn foreign_job_edit_looks_missing() {
        let state = AppState::fake();
        let boss = seed_user(&state, "boss@example.com", Role::Admin).await;
        seed_user(&state, "rival@example.com", Role::Admin).await;
        let job = seed_job(&state, &boss, &[]).await;
        let token = access_token(&state, "rival@example.com", Role::Admin);
        let (status, body) = call(
            build_app(state),
            Method::GET,
            &format!("/api/jobs/admin/{}", job.id),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Job not found");
    }

    #[tokio::test]
    async fn match_score_over_http() {
        let state = AppState::fake();
        let boss = seed_user(&state, "boss@example.com", Role::Admin).await;
        seed_user(&state, "ann@example.com", Role::JobSeeker).await;
        let job = seed_job(&state, &boss, &["python", "react", "sql"]).await;
        let token = access_token(&state, "ann@example.com", Role::JobSeeker);
        let app = build_app(state);

        let (status, _) = call(
            app.clone(),
            Method::POST,
            "/api/profile/create",
            Some(&token),
            Some(json!({
                "full_name": "Ann Seeker",
                "email": "ann@example.com",
                "phone": "+49 30 1234",
                "location": "Munich",
                "skills": ["python", "sql"]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(
            app,
            Method::GET,
            &format!("/api/matching/job-match-score/{}", job.id),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["match_score"], 46.7);
        assert_eq!(body["missing_skills"], json!(["react"]));
    }

    #[tokio::test]
    async fn user_routes_are_mounted() {
        let state = AppState::fake();
        let boss = seed_user(&state, "boss@example.com", Role::Admin).await;
        seed_user(&state, "ann@example.com", Role::JobSeeker).await;
        seed_job(&state, &boss, &[]).await;
        seed_job(&state, &boss, &[]).await;
        let token = access_token(&state, "ann@example.com", Role::JobSeeker);
        let app = build_app(state);

        let (status, body) = call(
            app.clone(),
            Method::GET,
            "/api/user/search-jobs?search=backend&limit=1",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
        assert_eq!(body["pages"], 2);

        let (status, body) = call(
            app.clone(),
            Method::GET,
            "/api/user/application-status/undefined",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"has_applied": false}));

        let (status, _) = call(app, Method::GET, "/api/user/export-data", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
