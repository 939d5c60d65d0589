use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::applications::repo::ApplicationRepo;
use crate::applications::repo_types::{
    Application, ApplicationReview, ApplicationStatus, NewApplication,
};
use crate::auth::repo::UserRepo;
use crate::auth::repo_types::{NewUser, User};
use crate::jobs::repo::JobRepo;
use crate::jobs::repo_types::{Job, JobFilter, JobPatch, JobStatus, NewJob};
use crate::profile::repo::ProfileRepo;
use crate::profile::repo_types::{Profile, ProfileInput};
use crate::saved_jobs::repo::SavedJobRepo;
use crate::saved_jobs::repo_types::{NewSavedJob, SavedJob};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    profiles: HashMap<Uuid, Profile>, // keyed by user id
    jobs: HashMap<Uuid, Job>,
    applications: HashMap<Uuid, Application>,
    saved_jobs: HashMap<Uuid, SavedJob>,
}

/// Process-local store. Used by tests and `STORE_BACKEND=memory`.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> OffsetDateTime) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn insert_user(&self, new: NewUser) -> anyhow::Result<User> {
        let mut t = self.tables.write().await;
        if t.users.values().any(|u| u.email == new.email) {
            anyhow::bail!("duplicate email {}", new.email);
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            email: new.email,
            full_name: new.full_name,
            password_hash: new.password_hash,
            role: new.role,
            is_active: true,
            profile_completed: false,
            created_at: now,
            updated_at: now,
            last_login: None,
        };
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn record_login(&self, id: Uuid, at: OffsetDateTime) -> anyhow::Result<()> {
        if let Some(u) = self.tables.write().await.users.get_mut(&id) {
            u.last_login = Some(at);
        }
        Ok(())
    }

    async fn set_password_hash(&self, id: Uuid, hash: &str) -> anyhow::Result<()> {
        if let Some(u) = self.tables.write().await.users.get_mut(&id) {
            u.password_hash = hash.to_string();
            u.updated_at = OffsetDateTime::now_utc();
        }
        Ok(())
    }

    async fn mark_profile_completed(&self, id: Uuid) -> anyhow::Result<()> {
        if let Some(u) = self.tables.write().await.users.get_mut(&id) {
            u.profile_completed = true;
            u.updated_at = OffsetDateTime::now_utc();
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileRepo for MemoryStore {
    async fn find_profile_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
        Ok(self.tables.read().await.profiles.get(&user_id).cloned())
    }

    async fn upsert_profile(&self, user_id: Uuid, input: ProfileInput) -> anyhow::Result<Profile> {
        let mut t = self.tables.write().await;
        let now = OffsetDateTime::now_utc();
        let profile = match t.profiles.get(&user_id) {
            Some(old) => Profile {
                full_name: input.full_name,
                email: input.email,
                phone: input.phone,
                location: input.location,
                headline: input.headline.or_else(|| old.headline.clone()),
                about: input.about.or_else(|| old.about.clone()),
                education: input.education.or_else(|| old.education.clone()),
                experience: input.experience.or_else(|| old.experience.clone()),
                skills: input.skills,
                cv_uploaded: old.cv_uploaded || input.cv_filename.is_some(),
                cv_filename: input.cv_filename.or_else(|| old.cv_filename.clone()),
                profile_completed: true,
                updated_at: now,
                ..old.clone()
            },
            None => Profile {
                id: Uuid::new_v4(),
                user_id,
                full_name: input.full_name,
                email: input.email,
                phone: input.phone,
                location: input.location,
                headline: input.headline,
                about: input.about,
                education: input.education,
                experience: input.experience,
                skills: input.skills,
                cv_uploaded: input.cv_filename.is_some(),
                cv_filename: input.cv_filename,
                profile_completed: true,
                created_at: now,
                updated_at: now,
            },
        };
        t.profiles.insert(user_id, profile.clone());
        Ok(profile)
    }
}

#[async_trait]
impl JobRepo for MemoryStore {
    async fn insert_job(&self, new: NewJob) -> anyhow::Result<Job> {
        let now = OffsetDateTime::now_utc();
        let job = Job {
            id: Uuid::new_v4(),
            title: new.title,
            company: new.company,
            location: new.location,
            job_type: new.job_type,
            salary: new.salary,
            description: new.description,
            requirements: new.requirements,
            benefits: new.benefits,
            skills: new.skills,
            status: new.status,
            experience_level: new.experience_level,
            application_deadline: new.application_deadline,
            posted_by: new.posted_by,
            posted_by_email: new.posted_by_email,
            posted_by_name: new.posted_by_name,
            posted_date: now,
            applications_count: 0,
            updated_at: now,
        };
        self.tables.write().await.jobs.insert(job.id, job.clone());
        Ok(job)
    }

    async fn find_job(&self, id: Uuid) -> anyhow::Result<Option<Job>> {
        Ok(self.tables.read().await.jobs.get(&id).cloned())
    }

    async fn list_jobs(&self, filter: &JobFilter) -> anyhow::Result<Vec<Job>> {
        let t = self.tables.read().await;
        let mut jobs: Vec<Job> = t.jobs.values().filter(|j| filter.matches(j)).cloned().collect();
        newest_first(&mut jobs, |j| j.posted_date);
        Ok(jobs
            .into_iter()
            .skip(filter.skip.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .collect())
    }

    async fn count_jobs(&self, filter: &JobFilter) -> anyhow::Result<i64> {
        let t = self.tables.read().await;
        Ok(t.jobs.values().filter(|j| filter.matches(j)).count() as i64)
    }

    async fn list_similar_jobs(&self, job: &Job, limit: i64) -> anyhow::Result<Vec<Job>> {
        let t = self.tables.read().await;
        let mut jobs: Vec<Job> = t
            .jobs
            .values()
            .filter(|j| j.id != job.id && j.status == JobStatus::Active)
            .filter(|j| {
                j.skills.iter().any(|s| job.skills.contains(s))
                    || j.location == job.location
                    || j.job_type == job.job_type
                    || j.company == job.company
            })
            .cloned()
            .collect();
        newest_first(&mut jobs, |j| j.posted_date);
        jobs.truncate(limit.max(0) as usize);
        Ok(jobs)
    }

    async fn list_jobs_by_poster(&self, poster: Uuid) -> anyhow::Result<Vec<Job>> {
        let t = self.tables.read().await;
        let mut jobs: Vec<Job> = t.jobs.values().filter(|j| j.posted_by == poster).cloned().collect();
        newest_first(&mut jobs, |j| j.posted_date);
        Ok(jobs)
    }

    async fn update_job(&self, id: Uuid, patch: JobPatch) -> anyhow::Result<Option<Job>> {
        let mut t = self.tables.write().await;
        Ok(t.jobs.get_mut(&id).map(|job| {
            patch.apply_to(job);
            job.updated_at = OffsetDateTime::now_utc();
            job.clone()
        }))
    }

    async fn delete_job(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.tables.write().await.jobs.remove(&id).is_some())
    }

    async fn increment_applications(&self, id: Uuid) -> anyhow::Result<()> {
        if let Some(job) = self.tables.write().await.jobs.get_mut(&id) {
            job.applications_count += 1;
        }
        Ok(())
    }

    async fn count_jobs_by_poster(
        &self,
        poster: Uuid,
        status: Option<JobStatus>,
    ) -> anyhow::Result<i64> {
        let t = self.tables.read().await;
        let n = t
            .jobs
            .values()
            .filter(|j| j.posted_by == poster && status.map_or(true, |s| j.status == s))
            .count();
        Ok(n as i64)
    }
}

#[async_trait]
impl ApplicationRepo for MemoryStore {
    async fn find_application(&self, id: Uuid) -> anyhow::Result<Option<Application>> {
        Ok(self.tables.read().await.applications.get(&id).cloned())
    }

    async fn find_application_for(
        &self,
        job_id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<Option<Application>> {
        let t = self.tables.read().await;
        Ok(t.applications
            .values()
            .find(|a| a.job_id == job_id && a.user_id == user_id)
            .cloned())
    }

    async fn insert_application(
        &self,
        new: NewApplication,
    ) -> anyhow::Result<Option<Application>> {
        let mut t = self.tables.write().await;
        if t.applications
            .values()
            .any(|a| a.job_id == new.job_id && a.user_id == new.user_id)
        {
            return Ok(None);
        }
        let app = Application {
            id: Uuid::new_v4(),
            job_id: new.job_id,
            job_title: new.job_title,
            job_company: new.job_company,
            user_id: new.user_id,
            user_name: new.user_name,
            user_email: new.user_email,
            user_phone: new.user_phone,
            cover_letter: new.cover_letter,
            resume_url: new.resume_url,
            portfolio_url: new.portfolio_url,
            linkedin_url: new.linkedin_url,
            status: new.status,
            applied_at: OffsetDateTime::now_utc(),
            reviewed_at: None,
            reviewed_by: None,
            notes: None,
        };
        t.applications.insert(app.id, app.clone());
        Ok(Some(app))
    }

    async fn list_applications_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Application>> {
        let t = self.tables.read().await;
        let mut apps: Vec<Application> = t
            .applications
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut apps, |a| a.applied_at);
        Ok(apps)
    }

    async fn list_applications_for_jobs(
        &self,
        job_ids: &[Uuid],
        status: Option<ApplicationStatus>,
    ) -> anyhow::Result<Vec<Application>> {
        let t = self.tables.read().await;
        let mut apps: Vec<Application> = t
            .applications
            .values()
            .filter(|a| job_ids.contains(&a.job_id) && status.map_or(true, |s| a.status == s))
            .cloned()
            .collect();
        newest_first(&mut apps, |a| a.applied_at);
        Ok(apps)
    }

    async fn review_application(
        &self,
        id: Uuid,
        review: ApplicationReview,
    ) -> anyhow::Result<Option<Application>> {
        let mut t = self.tables.write().await;
        Ok(t.applications.get_mut(&id).map(|app| {
            if let Some(status) = review.status {
                app.status = status;
            }
            if let Some(notes) = review.notes {
                app.notes = Some(notes);
            }
            app.reviewed_by = Some(review.reviewed_by);
            app.reviewed_at = Some(review.reviewed_at);
            app.clone()
        }))
    }

    async fn count_applications_by_status(
        &self,
        job_ids: &[Uuid],
    ) -> anyhow::Result<Vec<(ApplicationStatus, i64)>> {
        let t = self.tables.read().await;
        let mut counts: HashMap<ApplicationStatus, i64> = HashMap::new();
        for app in t.applications.values().filter(|a| job_ids.contains(&a.job_id)) {
            *counts.entry(app.status).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }

    async fn count_applications_by_user(
        &self,
        user_id: Uuid,
        statuses: &[ApplicationStatus],
    ) -> anyhow::Result<i64> {
        let t = self.tables.read().await;
        let n = t
            .applications
            .values()
            .filter(|a| a.user_id == user_id)
            .filter(|a| statuses.is_empty() || statuses.contains(&a.status))
            .count();
        Ok(n as i64)
    }

    async fn count_unique_applicants(&self, job_ids: &[Uuid]) -> anyhow::Result<i64> {
        let t = self.tables.read().await;
        let users: HashSet<Uuid> = t
            .applications
            .values()
            .filter(|a| job_ids.contains(&a.job_id))
            .map(|a| a.user_id)
            .collect();
        Ok(users.len() as i64)
    }
}

#[async_trait]
impl SavedJobRepo for MemoryStore {
    async fn list_saved_jobs(&self, user_id: Uuid) -> anyhow::Result<Vec<SavedJob>> {
        let t = self.tables.read().await;
        let mut saved: Vec<SavedJob> = t
            .saved_jobs
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut saved, |s| s.saved_at);
        Ok(saved)
    }

    async fn find_saved_job(
        &self,
        user_id: Uuid,
        job_id: Uuid,
    ) -> anyhow::Result<Option<SavedJob>> {
        let t = self.tables.read().await;
        Ok(t.saved_jobs
            .values()
            .find(|s| s.user_id == user_id && s.job_id == job_id)
            .cloned())
    }

    async fn insert_saved_job(&self, new: NewSavedJob) -> anyhow::Result<Option<SavedJob>> {
        let mut t = self.tables.write().await;
        if t.saved_jobs
            .values()
            .any(|s| s.user_id == new.user_id && s.job_id == new.job_id)
        {
            return Ok(None);
        }
        let saved = SavedJob {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            job_id: new.job_id,
            title: new.title,
            company: new.company,
            location: new.location,
            job_type: new.job_type,
            salary: new.salary,
            saved_at: OffsetDateTime::now_utc(),
        };
        t.saved_jobs.insert(saved.id, saved.clone());
        Ok(Some(saved))
    }

    async fn delete_saved_job(&self, user_id: Uuid, job_id: Uuid) -> anyhow::Result<u64> {
        let mut t = self.tables.write().await;
        let before = t.saved_jobs.len();
        t.saved_jobs
            .retain(|_, s| !(s.user_id == user_id && s.job_id == job_id));
        Ok((before - t.saved_jobs.len()) as u64)
    }

    async fn count_saved_jobs(&self, user_id: Uuid) -> anyhow::Result<i64> {
        let t = self.tables.read().await;
        Ok(t.saved_jobs.values().filter(|s| s.user_id == user_id).count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::Role;
    use crate::jobs::repo_types::JobType;

    fn new_job(poster: Uuid, title: &str, skills: &[&str]) -> NewJob {
        NewJob {
            title: title.into(),
            company: "Acme".into(),
            location: "Berlin, Germany".into(),
            job_type: JobType::FullTime,
            salary: None,
            description: "Build things".into(),
            requirements: "Rust".into(),
            benefits: None,
            skills: skills.iter().map(|s| s.to_string()).collect(),
            status: JobStatus::Active,
            experience_level: None,
            application_deadline: None,
            posted_by: poster,
            posted_by_email: "boss@example.com".into(),
            posted_by_name: "Boss".into(),
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        let new = NewUser {
            email: "ann@example.com".into(),
            full_name: "Ann".into(),
            password_hash: "x".into(),
            role: Role::JobSeeker,
        };
        store.insert_user(new.clone()).await.unwrap();
        assert!(store.insert_user(new).await.is_err());
    }

    #[tokio::test]
    async fn list_jobs_filters_and_pages() {
        let store = MemoryStore::new();
        let poster = Uuid::new_v4();
        store.insert_job(new_job(poster, "Rust dev", &["rust"])).await.unwrap();
        store.insert_job(new_job(poster, "Go dev", &["go"])).await.unwrap();
        let hidden = store.insert_job(new_job(poster, "Rust lead", &["rust"])).await.unwrap();
        store
            .update_job(hidden.id, JobPatch { status: Some(JobStatus::Inactive), ..Default::default() })
            .await
            .unwrap();

        let filter = JobFilter { skills: vec!["rust".into()], limit: 20, ..Default::default() };
        let jobs = store.list_jobs(&filter).await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "Rust dev");

        let page = JobFilter { limit: 1, ..Default::default() };
        assert_eq!(store.list_jobs(&page).await.unwrap().len(), 1);
        assert_eq!(store.count_jobs(&page).await.unwrap(), 2);

        let wildcard = JobFilter { search: Some("%".into()), limit: 20, ..Default::default() };
        assert_eq!(store.count_jobs(&wildcard).await.unwrap(), 0);
        assert_eq!(store.count_jobs_by_poster(poster, None).await.unwrap(), 3);
        assert_eq!(
            store.count_jobs_by_poster(poster, Some(JobStatus::Active)).await.unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn upsert_keeps_optional_fields() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        store
            .upsert_profile(
                user,
                ProfileInput {
                    full_name: "Ann".into(),
                    headline: Some("Engineer".into()),
                    cv_filename: Some("cv.pdf".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let updated = store
            .upsert_profile(user, ProfileInput { full_name: "Ann B".into(), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(updated.full_name, "Ann B");
        assert_eq!(updated.headline.as_deref(), Some("Engineer"));
        assert!(updated.cv_uploaded);
    }

    #[tokio::test]
    async fn saved_job_delete_reports_count() {
        let store = MemoryStore::new();
        let (user, job) = (Uuid::new_v4(), Uuid::new_v4());
        let bookmark = NewSavedJob {
            user_id: user,
            job_id: job,
            title: "Rust dev".into(),
            company: "Acme".into(),
            location: "Berlin".into(),
            job_type: "Full-Time".into(),
            salary: None,
        };
        assert!(store.insert_saved_job(bookmark.clone()).await.unwrap().is_some());
        assert!(store.insert_saved_job(bookmark).await.unwrap().is_none());
        assert_eq!(store.count_saved_jobs(user).await.unwrap(), 1);
        assert_eq!(store.delete_saved_job(user, job).await.unwrap(), 1);
        assert_eq!(store.delete_saved_job(user, job).await.unwrap(), 0);
    }
}
