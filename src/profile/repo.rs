use async_trait::async_trait;
use uuid::Uuid;

use super::repo_types::{Profile, ProfileInput};
use crate::store::PgStore;

const PROFILE_COLUMNS: &str = "id, user_id, full_name, email, phone, location, headline, about, \
                               education, experience, skills, cv_uploaded, cv_filename, \
                               profile_completed, created_at, updated_at";

#[async_trait]
pub trait ProfileRepo: Send + Sync {
    async fn find_profile_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<Profile>>;
    /// Creates the profile or updates the existing one in place.
    async fn upsert_profile(&self, user_id: Uuid, input: ProfileInput) -> anyhow::Result<Profile>;
}

#[async_trait]
impl ProfileRepo for PgStore {
    async fn find_profile_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn upsert_profile(&self, user_id: Uuid, input: ProfileInput) -> anyhow::Result<Profile> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            r#"
            INSERT INTO profiles (id, user_id, full_name, email, phone, location, headline,
                                  about, education, experience, skills, cv_uploaded, cv_filename)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12 IS NOT NULL, $12)
            ON CONFLICT (user_id) DO UPDATE SET
                full_name   = EXCLUDED.full_name,
                email       = EXCLUDED.email,
                phone       = EXCLUDED.phone,
                location    = EXCLUDED.location,
                headline    = COALESCE(EXCLUDED.headline, profiles.headline),
                about       = COALESCE(EXCLUDED.about, profiles.about),
                education   = COALESCE(EXCLUDED.education, profiles.education),
                experience  = COALESCE(EXCLUDED.experience, profiles.experience),
                skills      = EXCLUDED.skills,
                cv_uploaded = profiles.cv_uploaded OR EXCLUDED.cv_uploaded,
                cv_filename = COALESCE(EXCLUDED.cv_filename, profiles.cv_filename),
                profile_completed = TRUE,
                updated_at  = now()
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&input.full_name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.location)
        .bind(&input.headline)
        .bind(&input.about)
        .bind(&input.education)
        .bind(&input.experience)
        .bind(&input.skills)
        .bind(&input.cv_filename)
        .fetch_one(&self.pool)
        .await?;
        Ok(profile)
    }
}
