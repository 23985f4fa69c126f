//! 开发者与客户资料

use std::collections::HashMap;
use std::sync::Arc;

use ryze_common::{Pagination, UserId};
use ryze_errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::entities::{ClientProfile, DeveloperProfile, User, UserType};
use crate::domain::repositories::{ProfileRepository, UserRepository};

use super::dto::{MAX_NAME_LEN, ensure_max_len};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDeveloperProfile {
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub experience_years: i32,
    pub bio: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDeveloperProfile {
    pub skills: Option<String>,
    pub experience_years: Option<i32>,
    pub bio: Option<String>,
    pub is_public: Option<bool>,
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientProfileFields {
    pub company_name: Option<String>,
    pub industry: Option<String>,
    pub company_size: Option<String>,
    pub website: Option<String>,
}

impl ClientProfileFields {
    fn validate(&self) -> AppResult<()> {
        let fields = [
            (&self.company_name, "Company name", MAX_NAME_LEN),
            (&self.industry, "Industry", MAX_NAME_LEN),
            (&self.company_size, "Company size", 50),
        ];
        for (value, field, max) in fields {
            if let Some(value) = value {
                ensure_max_len(value, field, max)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileStatus {
    pub has_profile: bool,
    pub user_type: UserType,
}

/// 公开开发者资料
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicDeveloperOut {
    pub user_id: UserId,
    pub username: String,
    pub full_name: String,
    pub skills: String,
    pub experience_years: i32,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
    pub rating: Option<f64>,
    pub total_projects: i32,
    pub success_rate: f64,
}

impl PublicDeveloperOut {
    fn new(profile: DeveloperProfile, user: &User) -> Self {
        Self {
            user_id: profile.user_id,
            username: user.username.as_str().to_string(),
            full_name: user.full_name.clone(),
            skills: profile.skills,
            experience_years: profile.experience_years,
            bio: profile.bio,
            profile_image_url: profile.profile_image_url,
            rating: profile.rating,
            total_projects: profile.total_projects,
            success_rate: profile.success_rate,
        }
    }
}

fn validate_experience(years: i32) -> AppResult<i32> {
    if years < 0 {
        return Err(AppError::validation("experience_years cannot be negative"));
    }
    Ok(years)
}

pub struct ProfileService {
    users: Arc<dyn UserRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    pub fn new(users: Arc<dyn UserRepository>, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { users, profiles }
    }

    pub async fn developer_profile(&self, user: &User) -> AppResult<DeveloperProfile> {
        self.profiles
            .find_developer(&user.id)
            .await?
            .ok_or_else(|| AppError::not_found("Developer profile not found"))
    }

    pub async fn create_developer_profile(
        &self,
        user: &User,
        input: CreateDeveloperProfile,
    ) -> AppResult<DeveloperProfile> {
        if !user.is_developer() {
            return Err(AppError::forbidden(
                "Only developers can create developer profiles",
            ));
        }
        if self.profiles.find_developer(&user.id).await?.is_some() {
            return Err(AppError::conflict("Developer profile already exists"));
        }

        let mut profile = DeveloperProfile::new(
            user.id,
            input.skills.trim(),
            validate_experience(input.experience_years)?,
        );
        profile.bio = input.bio;
        profile.is_public = input.is_public;
        profile.profile_image_url = input.profile_image_url;

        self.profiles.save_developer(&profile).await?;
        info!(user_id = %user.id, "Developer profile created");
        Ok(profile)
    }

    pub async fn update_developer_profile(
        &self,
        user: &User,
        input: UpdateDeveloperProfile,
    ) -> AppResult<DeveloperProfile> {
        let mut profile = self.developer_profile(user).await?;

        if let Some(skills) = input.skills {
            profile.skills = skills.trim().to_string();
        }
        if let Some(years) = input.experience_years {
            profile.experience_years = validate_experience(years)?;
        }
        if input.bio.is_some() {
            profile.bio = input.bio;
        }
        if let Some(is_public) = input.is_public {
            profile.is_public = is_public;
        }
        if input.profile_image_url.is_some() {
            profile.profile_image_url = input.profile_image_url;
        }

        self.profiles.update_developer(&profile).await?;
        Ok(profile)
    }

    pub async fn set_developer_visibility(
        &self,
        user: &User,
        is_public: bool,
    ) -> AppResult<DeveloperProfile> {
        let mut profile = self.developer_profile(user).await?;
        profile.is_public = is_public;
        self.profiles.update_developer(&profile).await?;
        info!(user_id = %user.id, is_public, "Developer profile visibility changed");
        Ok(profile)
    }

    pub async fn client_profile(&self, user: &User) -> AppResult<ClientProfile> {
        self.profiles
            .find_client(&user.id)
            .await?
            .ok_or_else(|| AppError::not_found("Client profile not found"))
    }

    pub async fn create_client_profile(
        &self,
        user: &User,
        input: ClientProfileFields,
    ) -> AppResult<ClientProfile> {
        if !user.is_client() {
            return Err(AppError::forbidden(
                "Only clients can create client profiles",
            ));
        }
        if self.profiles.find_client(&user.id).await?.is_some() {
            return Err(AppError::conflict("Client profile already exists"));
        }
        input.validate()?;

        let mut profile = ClientProfile::new(user.id);
        profile.company_name = input.company_name;
        profile.industry = input.industry;
        profile.company_size = input.company_size;
        profile.website = input.website;

        self.profiles.save_client(&profile).await?;
        info!(user_id = %user.id, "Client profile created");
        Ok(profile)
    }

    pub async fn update_client_profile(
        &self,
        user: &User,
        input: ClientProfileFields,
    ) -> AppResult<ClientProfile> {
        input.validate()?;
        let mut profile = self.client_profile(user).await?;

        if input.company_name.is_some() {
            profile.company_name = input.company_name;
        }
        if input.industry.is_some() {
            profile.industry = input.industry;
        }
        if input.company_size.is_some() {
            profile.company_size = input.company_size;
        }
        if input.website.is_some() {
            profile.website = input.website;
        }

        self.profiles.update_client(&profile).await?;
        Ok(profile)
    }

    /// 当前用户类型对应的资料是否存在
    pub async fn check_profile(&self, user: &User) -> AppResult<ProfileStatus> {
        let has_profile = match user.user_type {
            UserType::Developer => self.profiles.find_developer(&user.id).await?.is_some(),
            UserType::Client => self.profiles.find_client(&user.id).await?.is_some(),
        };
        Ok(ProfileStatus {
            has_profile,
            user_type: user.user_type,
        })
    }

    pub async fn public_developers(&self, page: Pagination) -> AppResult<Vec<PublicDeveloperOut>> {
        let profiles = self.profiles.list_public_developers(page.clamped(100)).await?;
        let ids: Vec<UserId> = profiles.iter().map(|p| p.user_id).collect();
        let users: HashMap<UserId, User> = self
            .users
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(profiles
            .into_iter()
            .filter_map(|p| {
                let user = users.get(&p.user_id)?;
                Some(PublicDeveloperOut::new(p, user))
            })
            .collect())
    }

    pub async fn public_developer(&self, user_id: &UserId) -> AppResult<PublicDeveloperOut> {
        let not_found = || AppError::not_found("Public developer profile not found");

        let profile = self
            .profiles
            .find_developer(user_id)
            .await?
            .filter(|p| p.is_public)
            .ok_or_else(not_found)?;
        let user = self.users.find_by_id(user_id).await?.ok_or_else(not_found)?;

        Ok(PublicDeveloperOut::new(profile, &user))
    }
}
