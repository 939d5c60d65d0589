use async_trait::async_trait;
use tracing::info;

use crate::applications::repo_types::ApplicationStatus;

/// Outbound notifications. Delivery is best-effort; callers spawn the send
/// and only log failures.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_password_reset(
        &self,
        to: &str,
        user_name: &str,
        reset_token: &str,
    ) -> anyhow::Result<()>;

    async fn send_application_confirmation(
        &self,
        to: &str,
        user_name: &str,
        job_title: &str,
        company: &str,
    ) -> anyhow::Result<()>;

    async fn send_status_update(
        &self,
        to: &str,
        user_name: &str,
        job_title: &str,
        company: &str,
        status: ApplicationStatus,
    ) -> anyhow::Result<()>;
}

pub fn status_subject(status: ApplicationStatus, job_title: &str) -> String {
    let headline = match status {
        ApplicationStatus::Reviewed => "Your application has been reviewed",
        ApplicationStatus::Shortlisted => "Congratulations! You've been shortlisted",
        ApplicationStatus::Accepted => "Congratulations! Your application has been accepted",
        _ => "Application Update",
    };
    format!("{headline} - {job_title}")
}

/// Writes every message to the log instead of sending it.
pub struct LogMailer {
    frontend_url: String,
}

impl LogMailer {
    pub fn new(frontend_url: impl Into<String>) -> Self {
        Self { frontend_url: frontend_url.into() }
    }

    pub fn reset_link(&self, token: &str) -> String {
        format!(
            "{}/reset-password.html?token={token}",
            self.frontend_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_password_reset(
        &self,
        to: &str,
        user_name: &str,
        reset_token: &str,
    ) -> anyhow::Result<()> {
        let link = self.reset_link(reset_token);
        info!(%to, %user_name, %link, "mail: password reset");
        Ok(())
    }

    async fn send_application_confirmation(
        &self,
        to: &str,
        user_name: &str,
        job_title: &str,
        company: &str,
    ) -> anyhow::Result<()> {
        let subject = format!("Application Received - {job_title} at {company}");
        info!(%to, %user_name, %subject, "mail: application confirmation");
        Ok(())
    }

    async fn send_status_update(
        &self,
        to: &str,
        user_name: &str,
        job_title: &str,
        company: &str,
        status: ApplicationStatus,
    ) -> anyhow::Result<()> {
        let subject = status_subject(status, job_title);
        info!(%to, %user_name, %company, %subject, ?status, "mail: status update");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_link_points_at_frontend() {
        let mailer = LogMailer::new("http://localhost:3000/");
        assert_eq!(
            mailer.reset_link("abc"),
            "http://localhost:3000/reset-password.html?token=abc"
        );
    }

    #[test]
    fn status_subjects() {
        assert_eq!(
            status_subject(ApplicationStatus::Shortlisted, "Rust dev"),
            "Congratulations! You've been shortlisted - Rust dev"
        );
        assert_eq!(
            status_subject(ApplicationStatus::Rejected, "Rust dev"),
            "Application Update - Rust dev"
        );
    }

    #[tokio::test]
    async fn log_mailer_never_fails() {
        let mailer = LogMailer::new("http://x");
        assert!(mailer
            .send_application_confirmation("a@b.c", "Ann", "Rust dev", "Acme")
            .await
            .is_ok());
    }
}
