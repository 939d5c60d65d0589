use async_trait::async_trait;
use uuid::Uuid;

use super::repo_types::{
    Application, ApplicationReview, ApplicationRow, ApplicationStatus, NewApplication,
};
use crate::store::{decode_text, encode_text, PgStore};

const APPLICATION_COLUMNS: &str = "id, job_id, job_title, job_company, user_id, user_name, \
                                   user_email, user_phone, cover_letter, resume_url, \
                                   portfolio_url, linkedin_url, status, applied_at, \
                                   reviewed_at, reviewed_by, notes";

#[async_trait]
pub trait ApplicationRepo: Send + Sync {
    async fn find_application(&self, id: Uuid) -> anyhow::Result<Option<Application>>;
    async fn find_application_for(
        &self,
        job_id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<Option<Application>>;
    /// `None` when the user already applied to the job.
    async fn insert_application(&self, new: NewApplication)
        -> anyhow::Result<Option<Application>>;
    /// Newest first.
    async fn list_applications_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Application>>;
    /// Newest first, optionally restricted to one status.
    async fn list_applications_for_jobs(
        &self,
        job_ids: &[Uuid],
        status: Option<ApplicationStatus>,
    ) -> anyhow::Result<Vec<Application>>;
    async fn review_application(
        &self,
        id: Uuid,
        review: ApplicationReview,
    ) -> anyhow::Result<Option<Application>>;
    async fn count_applications_by_status(
        &self,
        job_ids: &[Uuid],
    ) -> anyhow::Result<Vec<(ApplicationStatus, i64)>>;
    /// An empty `statuses` slice counts every application.
    async fn count_applications_by_user(
        &self,
        user_id: Uuid,
        statuses: &[ApplicationStatus],
    ) -> anyhow::Result<i64>;
    async fn count_unique_applicants(&self, job_ids: &[Uuid]) -> anyhow::Result<i64>;
}

fn rows_to_applications(rows: Vec<ApplicationRow>) -> anyhow::Result<Vec<Application>> {
    rows.into_iter().map(Application::try_from).collect()
}

fn encode_statuses(statuses: &[ApplicationStatus]) -> anyhow::Result<Vec<String>> {
    statuses.iter().map(encode_text).collect()
}

#[async_trait]
impl ApplicationRepo for PgStore {
    async fn find_application(&self, id: Uuid) -> anyhow::Result<Option<Application>> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Application::try_from).transpose()
    }

    async fn find_application_for(
        &self,
        job_id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<Option<Application>> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE job_id = $1 AND user_id = $2"
        ))
        .bind(job_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Application::try_from).transpose()
    }

    async fn insert_application(
        &self,
        new: NewApplication,
    ) -> anyhow::Result<Option<Application>> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            INSERT INTO applications (id, job_id, job_title, job_company, user_id, user_name,
                                      user_email, user_phone, cover_letter, resume_url,
                                      portfolio_url, linkedin_url, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (job_id, user_id) DO NOTHING
            RETURNING {APPLICATION_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(new.job_id)
        .bind(&new.job_title)
        .bind(&new.job_company)
        .bind(new.user_id)
        .bind(&new.user_name)
        .bind(&new.user_email)
        .bind(&new.user_phone)
        .bind(&new.cover_letter)
        .bind(&new.resume_url)
        .bind(&new.portfolio_url)
        .bind(&new.linkedin_url)
        .bind(encode_text(&new.status)?)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Application::try_from).transpose()
    }

    async fn list_applications_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Application>> {
        let rows = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE user_id = $1 \
             ORDER BY applied_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows_to_applications(rows)
    }

    async fn list_applications_for_jobs(
        &self,
        job_ids: &[Uuid],
        status: Option<ApplicationStatus>,
    ) -> anyhow::Result<Vec<Application>> {
        let status = status.as_ref().map(encode_text).transpose()?;
        let rows = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications \
             WHERE job_id = ANY($1) AND ($2::text IS NULL OR status = $2) \
             ORDER BY applied_at DESC"
        ))
        .bind(job_ids)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        rows_to_applications(rows)
    }

    async fn review_application(
        &self,
        id: Uuid,
        review: ApplicationReview,
    ) -> anyhow::Result<Option<Application>> {
        let status = review.status.as_ref().map(encode_text).transpose()?;
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            UPDATE applications SET
                status      = COALESCE($2, status),
                notes       = COALESCE($3, notes),
                reviewed_by = $4,
                reviewed_at = $5
            WHERE id = $1
            RETURNING {APPLICATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .bind(&review.notes)
        .bind(&review.reviewed_by)
        .bind(review.reviewed_at)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Application::try_from).transpose()
    }

    async fn count_applications_by_status(
        &self,
        job_ids: &[Uuid],
    ) -> anyhow::Result<Vec<(ApplicationStatus, i64)>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM applications WHERE job_id = ANY($1) GROUP BY status",
        )
        .bind(job_ids)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|(status, count)| Ok((decode_text(&status)?, count)))
            .collect()
    }

    async fn count_applications_by_user(
        &self,
        user_id: Uuid,
        statuses: &[ApplicationStatus],
    ) -> anyhow::Result<i64> {
        let statuses = encode_statuses(statuses)?;
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM applications \
             WHERE user_id = $1 AND (cardinality($2::text[]) = 0 OR status = ANY($2))",
        )
        .bind(user_id)
        .bind(statuses)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn count_unique_applicants(&self, job_ids: &[Uuid]) -> anyhow::Result<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(DISTINCT user_id) FROM applications WHERE job_id = ANY($1)",
        )
        .bind(job_ids)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
