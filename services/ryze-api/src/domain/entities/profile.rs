//! 开发者与客户资料

use chrono::{DateTime, Utc};
use ryze_common::UserId;
use serde::{Deserialize, Serialize};

/// 开发者资料
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeveloperProfile {
    pub user_id: UserId,
    pub skills: String,
    pub experience_years: i32,
    pub bio: Option<String>,
    pub is_public: bool,
    pub profile_image_url: Option<String>,
    /// 平均评分
    pub rating: Option<f64>,
    pub total_projects: i32,
    pub success_rate: f64,
    pub created_at: DateTime<Utc>,
}

impl DeveloperProfile {
    pub fn new(user_id: UserId, skills: impl Into<String>, experience_years: i32) -> Self {
        Self {
            user_id,
            skills: skills.into(),
            experience_years,
            bio: None,
            is_public: false,
            profile_image_url: None,
            rating: None,
            total_projects: 0,
            success_rate: 0.0,
            created_at: Utc::now(),
        }
    }
}

/// 客户资料
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientProfile {
    pub user_id: UserId,
    pub company_name: Option<String>,
    pub industry: Option<String>,
    pub company_size: Option<String>,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ClientProfile {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            company_name: None,
            industry: None,
            company_size: None,
            website: None,
            created_at: Utc::now(),
        }
    }
}
