use async_trait::async_trait;
use uuid::Uuid;

use super::repo_types::{NewSavedJob, SavedJob};
use crate::store::PgStore;

const SAVED_JOB_COLUMNS: &str =
    "id, user_id, job_id, title, company, location, job_type, salary, saved_at";

#[async_trait]
pub trait SavedJobRepo: Send + Sync {
    /// Newest first.
    async fn list_saved_jobs(&self, user_id: Uuid) -> anyhow::Result<Vec<SavedJob>>;
    async fn find_saved_job(&self, user_id: Uuid, job_id: Uuid)
        -> anyhow::Result<Option<SavedJob>>;
    /// `None` when the job is already bookmarked by the user.
    async fn insert_saved_job(&self, new: NewSavedJob) -> anyhow::Result<Option<SavedJob>>;
    /// Returns the number of removed bookmarks (0 or 1).
    async fn delete_saved_job(&self, user_id: Uuid, job_id: Uuid) -> anyhow::Result<u64>;
    async fn count_saved_jobs(&self, user_id: Uuid) -> anyhow::Result<i64>;
}

#[async_trait]
impl SavedJobRepo for PgStore {
    async fn list_saved_jobs(&self, user_id: Uuid) -> anyhow::Result<Vec<SavedJob>> {
        let rows = sqlx::query_as::<_, SavedJob>(&format!(
            "SELECT {SAVED_JOB_COLUMNS} FROM saved_jobs WHERE user_id = $1 ORDER BY saved_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_saved_job(
        &self,
        user_id: Uuid,
        job_id: Uuid,
    ) -> anyhow::Result<Option<SavedJob>> {
        let row = sqlx::query_as::<_, SavedJob>(&format!(
            "SELECT {SAVED_JOB_COLUMNS} FROM saved_jobs WHERE user_id = $1 AND job_id = $2"
        ))
        .bind(user_id)
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_saved_job(&self, new: NewSavedJob) -> anyhow::Result<Option<SavedJob>> {
        let row = sqlx::query_as::<_, SavedJob>(&format!(
            r#"
            INSERT INTO saved_jobs (id, user_id, job_id, title, company, location, job_type, salary)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id, job_id) DO NOTHING
            RETURNING {SAVED_JOB_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(new.job_id)
        .bind(&new.title)
        .bind(&new.company)
        .bind(&new.location)
        .bind(&new.job_type)
        .bind(&new.salary)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_saved_job(&self, user_id: Uuid, job_id: Uuid) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM saved_jobs WHERE user_id = $1 AND job_id = $2")
            .bind(user_id)
            .bind(job_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    async fn count_saved_jobs(&self, user_id: Uuid) -> anyhow::Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM saved_jobs WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
