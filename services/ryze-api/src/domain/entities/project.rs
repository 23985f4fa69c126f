//! 项目实体

use chrono::{DateTime, Utc};
use ryze_common::{ProjectId, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub user_id: UserId,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Project {
    pub fn new(owner: UserId, name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: ProjectId::new(),
            name: name.into(),
            description,
            user_id: owner,
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.user_id == *user_id
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}
