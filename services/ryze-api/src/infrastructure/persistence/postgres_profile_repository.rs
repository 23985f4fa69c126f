//! PostgreSQL 资料 Repository 实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ryze_adapter_postgres::map_db_error;
use ryze_common::{Pagination, UserId};
use ryze_errors::AppResult;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{ClientProfile, DeveloperProfile};
use crate::domain::repositories::ProfileRepository;

pub struct PostgresProfileRepository {
    pool: PgPool,
}

impl PostgresProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn find_developer(&self, user_id: &UserId) -> AppResult<Option<DeveloperProfile>> {
        let row = sqlx::query_as::<_, DeveloperProfileRow>(
            r#"
            SELECT user_id, skills, experience_years, bio, is_public, profile_image_url,
                   rating, total_projects, success_rate, created_at
            FROM developer_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "developer profile"))?;

        Ok(row.map(Into::into))
    }

    async fn save_developer(&self, profile: &DeveloperProfile) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO developer_profiles (user_id, skills, experience_years, bio, is_public,
                                            profile_image_url, rating, total_projects,
                                            success_rate, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(profile.user_id.0)
        .bind(&profile.skills)
        .bind(profile.experience_years)
        .bind(&profile.bio)
        .bind(profile.is_public)
        .bind(&profile.profile_image_url)
        .bind(profile.rating)
        .bind(profile.total_projects)
        .bind(profile.success_rate)
        .bind(profile.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Developer profile"))?;

        Ok(())
    }

    async fn update_developer(&self, profile: &DeveloperProfile) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE developer_profiles SET
                skills = $2, experience_years = $3, bio = $4, is_public = $5,
                profile_image_url = $6, rating = $7, total_projects = $8, success_rate = $9
            WHERE user_id = $1
            "#,
        )
        .bind(profile.user_id.0)
        .bind(&profile.skills)
        .bind(profile.experience_years)
        .bind(&profile.bio)
        .bind(profile.is_public)
        .bind(&profile.profile_image_url)
        .bind(profile.rating)
        .bind(profile.total_projects)
        .bind(profile.success_rate)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "developer profile"))?;

        Ok(())
    }

    async fn list_public_developers(&self, page: Pagination) -> AppResult<Vec<DeveloperProfile>> {
        let rows = sqlx::query_as::<_, DeveloperProfileRow>(
            r#"
            SELECT user_id, skills, experience_years, bio, is_public, profile_image_url,
                   rating, total_projects, success_rate, created_at
            FROM developer_profiles
            WHERE is_public = TRUE
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "developer profile"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_client(&self, user_id: &UserId) -> AppResult<Option<ClientProfile>> {
        let row = sqlx::query_as::<_, ClientProfileRow>(
            r#"
            SELECT user_id, company_name, industry, company_size, website, created_at
            FROM client_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "client profile"))?;

        Ok(row.map(Into::into))
    }

    async fn save_client(&self, profile: &ClientProfile) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO client_profiles (user_id, company_name, industry, company_size,
                                         website, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(profile.user_id.0)
        .bind(&profile.company_name)
        .bind(&profile.industry)
        .bind(&profile.company_size)
        .bind(&profile.website)
        .bind(profile.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Client profile"))?;

        Ok(())
    }

    async fn update_client(&self, profile: &ClientProfile) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE client_profiles SET
                company_name = $2, industry = $3, company_size = $4, website = $5
            WHERE user_id = $1
            "#,
        )
        .bind(profile.user_id.0)
        .bind(&profile.company_name)
        .bind(&profile.industry)
        .bind(&profile.company_size)
        .bind(&profile.website)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "client profile"))?;

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct DeveloperProfileRow {
    user_id: Uuid,
    skills: String,
    experience_years: i32,
    bio: Option<String>,
    is_public: bool,
    profile_image_url: Option<String>,
    rating: Option<f64>,
    total_projects: i32,
    success_rate: f64,
    created_at: DateTime<Utc>,
}

impl From<DeveloperProfileRow> for DeveloperProfile {
    fn from(row: DeveloperProfileRow) -> Self {
        Self {
            user_id: UserId::from_uuid(row.user_id),
            skills: row.skills,
            experience_years: row.experience_years,
            bio: row.bio,
            is_public: row.is_public,
            profile_image_url: row.profile_image_url,
            rating: row.rating,
            total_projects: row.total_projects,
            success_rate: row.success_rate,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ClientProfileRow {
    user_id: Uuid,
    company_name: Option<String>,
    industry: Option<String>,
    company_size: Option<String>,
    website: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ClientProfileRow> for ClientProfile {
    fn from(row: ClientProfileRow) -> Self {
        Self {
            user_id: UserId::from_uuid(row.user_id),
            company_name: row.company_name,
            industry: row.industry,
            company_size: row.company_size,
            website: row.website,
            created_at: row.created_at,
        }
    }
}
