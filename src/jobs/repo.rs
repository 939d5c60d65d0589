use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::repo_types::{Job, JobFilter, JobPatch, JobRow, JobStatus, NewJob};
use crate::store::{encode_text, PgStore};

/// Substring pattern for ILIKE with the wildcards in `raw` taken literally.
fn contains_pattern(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('%');
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

const JOB_COLUMNS: &str = "id, title, company, location, job_type, salary, description, \
                           requirements, benefits, skills, status, experience_level, \
                           application_deadline, posted_by, posted_by_email, posted_by_name, \
                           posted_date, applications_count, updated_at";

#[async_trait]
pub trait JobRepo: Send + Sync {
    async fn insert_job(&self, new: NewJob) -> anyhow::Result<Job>;
    async fn find_job(&self, id: Uuid) -> anyhow::Result<Option<Job>>;
    /// Active postings matching `filter`, newest first.
    async fn list_jobs(&self, filter: &JobFilter) -> anyhow::Result<Vec<Job>>;
    /// Size of the unpaged result of `list_jobs`.
    async fn count_jobs(&self, filter: &JobFilter) -> anyhow::Result<i64>;
    /// Other active postings sharing a skill, the location, the type or the
    /// company with `job`, newest first.
    async fn list_similar_jobs(&self, job: &Job, limit: i64) -> anyhow::Result<Vec<Job>>;
    async fn list_jobs_by_poster(&self, poster: Uuid) -> anyhow::Result<Vec<Job>>;
    async fn update_job(&self, id: Uuid, patch: JobPatch) -> anyhow::Result<Option<Job>>;
    async fn delete_job(&self, id: Uuid) -> anyhow::Result<bool>;
    async fn increment_applications(&self, id: Uuid) -> anyhow::Result<()>;
    async fn count_jobs_by_poster(
        &self,
        poster: Uuid,
        status: Option<JobStatus>,
    ) -> anyhow::Result<i64>;
}

/// Appends the listing predicates to a builder that ends with `WHERE `.
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &JobFilter) -> anyhow::Result<()> {
    qb.push("status = ").push_bind(encode_text(&JobStatus::Active)?);
    if let Some(search) = &filter.search {
        let pattern = contains_pattern(search);
        qb.push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR company ILIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR description ILIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\' OR EXISTS (SELECT 1 FROM unnest(skills) s WHERE lower(s) = lower(")
            .push_bind(search.clone())
            .push(")))");
    }
    if let Some(location) = &filter.location {
        qb.push(" AND location ILIKE ")
            .push_bind(contains_pattern(location))
            .push(" ESCAPE '\\'");
    }
    if let Some(job_type) = &filter.job_type {
        qb.push(" AND job_type = ").push_bind(encode_text(job_type)?);
    }
    if let Some(level) = filter.experience_level {
        qb.push(" AND experience_level = ").push_bind(level.as_str());
    }
    if !filter.skills.is_empty() {
        qb.push(" AND skills && ").push_bind(filter.skills.clone());
    }
    Ok(())
}

fn rows_to_jobs(rows: Vec<JobRow>) -> anyhow::Result<Vec<Job>> {
    rows.into_iter().map(Job::try_from).collect()
}

#[async_trait]
impl JobRepo for PgStore {
    async fn insert_job(&self, new: NewJob) -> anyhow::Result<Job> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            INSERT INTO jobs (id, title, company, location, job_type, salary, description,
                              requirements, benefits, skills, status, experience_level,
                              application_deadline, posted_by, posted_by_email, posted_by_name)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new.title)
        .bind(&new.company)
        .bind(&new.location)
        .bind(encode_text(&new.job_type)?)
        .bind(&new.salary)
        .bind(&new.description)
        .bind(&new.requirements)
        .bind(&new.benefits)
        .bind(&new.skills)
        .bind(encode_text(&new.status)?)
        .bind(new.experience_level.map(|l| l.as_str()))
        .bind(new.application_deadline)
        .bind(new.posted_by)
        .bind(&new.posted_by_email)
        .bind(&new.posted_by_name)
        .fetch_one(&self.pool)
        .await?;
        Job::try_from(row)
    }

    async fn find_job(&self, id: Uuid) -> anyhow::Result<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Job::try_from).transpose()
    }

    async fn list_jobs(&self, filter: &JobFilter) -> anyhow::Result<Vec<Job>> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {JOB_COLUMNS} FROM jobs WHERE "));
        push_filter(&mut qb, filter)?;
        qb.push(" ORDER BY posted_date DESC OFFSET ")
            .push_bind(filter.skip)
            .push(" LIMIT ")
            .push_bind(filter.limit);

        let rows = qb.build_query_as::<JobRow>().fetch_all(&self.pool).await?;
        rows_to_jobs(rows)
    }

    async fn count_jobs(&self, filter: &JobFilter) -> anyhow::Result<i64> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM jobs WHERE ");
        push_filter(&mut qb, filter)?;
        let (count,) = qb.build_query_as::<(i64,)>().fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn list_similar_jobs(&self, job: &Job, limit: i64) -> anyhow::Result<Vec<Job>> {
        let rows = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            SELECT {JOB_COLUMNS} FROM jobs
            WHERE id <> $1 AND status = $2
              AND (skills && $3 OR location = $4 OR job_type = $5 OR company = $6)
            ORDER BY posted_date DESC
            LIMIT $7
            "#
        ))
        .bind(job.id)
        .bind(encode_text(&JobStatus::Active)?)
        .bind(&job.skills)
        .bind(&job.location)
        .bind(encode_text(&job.job_type)?)
        .bind(&job.company)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows_to_jobs(rows)
    }

    async fn list_jobs_by_poster(&self, poster: Uuid) -> anyhow::Result<Vec<Job>> {
        let rows = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE posted_by = $1 ORDER BY posted_date DESC"
        ))
        .bind(poster)
        .fetch_all(&self.pool)
        .await?;
        rows_to_jobs(rows)
    }

    async fn update_job(&self, id: Uuid, patch: JobPatch) -> anyhow::Result<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            UPDATE jobs SET
                title                = COALESCE($2, title),
                company              = COALESCE($3, company),
                location             = COALESCE($4, location),
                job_type             = COALESCE($5, job_type),
                salary               = COALESCE($6, salary),
                description          = COALESCE($7, description),
                requirements         = COALESCE($8, requirements),
                benefits             = COALESCE($9, benefits),
                skills               = COALESCE($10, skills),
                status               = COALESCE($11, status),
                experience_level     = COALESCE($12, experience_level),
                application_deadline = COALESCE($13, application_deadline),
                updated_at           = now()
            WHERE id = $1
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&patch.title)
        .bind(&patch.company)
        .bind(&patch.location)
        .bind(patch.job_type.as_ref().map(encode_text).transpose()?)
        .bind(&patch.salary)
        .bind(&patch.description)
        .bind(&patch.requirements)
        .bind(&patch.benefits)
        .bind(&patch.skills)
        .bind(patch.status.as_ref().map(encode_text).transpose()?)
        .bind(patch.experience_level.map(|l| l.as_str()))
        .bind(patch.application_deadline)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Job::try_from).transpose()
    }

    async fn delete_job(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn increment_applications(&self, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("UPDATE jobs SET applications_count = applications_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count_jobs_by_poster(
        &self,
        poster: Uuid,
        status: Option<JobStatus>,
    ) -> anyhow::Result<i64> {
        let status = status.as_ref().map(encode_text).transpose()?;
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM jobs WHERE posted_by = $1 AND ($2::text IS NULL OR status = $2)",
        )
        .bind(poster)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(contains_pattern("rust"), "%rust%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a_b\\c"), "%a\\_b\\\\c%");
    }
}
