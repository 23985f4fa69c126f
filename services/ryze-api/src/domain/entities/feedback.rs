//! 匿名反馈

use chrono::{DateTime, Utc};
use ryze_common::FeedbackId;
use ryze_errors::AppError;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Email;

const MAX_FIELD_LEN: usize = 255;

fn check_len(value: Option<&str>, field: &str) -> Result<(), AppError> {
    match value {
        Some(v) if v.chars().count() > MAX_FIELD_LEN => Err(AppError::validation(format!(
            "{} must be at most {} characters",
            field, MAX_FIELD_LEN
        ))),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub id: FeedbackId,
    pub name: Option<String>,
    pub email: Option<String>,
    pub rating: i16,
    pub comment: String,
    pub location: String,
    pub target_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Feedback {
    pub fn new(
        name: Option<String>,
        email: Option<String>,
        rating: i16,
        comment: &str,
        location: &str,
        target_id: Option<String>,
    ) -> Result<Self, AppError> {
        if !(1..=5).contains(&rating) {
            return Err(AppError::validation("Rating must be between 1 and 5"));
        }
        if comment.trim().is_empty() {
            return Err(AppError::validation("Comment cannot be empty"));
        }
        if location.trim().is_empty() {
            return Err(AppError::validation("Location cannot be empty"));
        }
        check_len(name.as_deref().map(str::trim), "Name")?;
        check_len(Some(location.trim()), "Location")?;
        check_len(target_id.as_deref(), "Target id")?;
        let email = match email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty()) {
            Some(e) => Some(Email::new(e)?.as_str().to_string()),
            None => None,
        };

        Ok(Self {
            id: FeedbackId::new(),
            name: name.filter(|n| !n.trim().is_empty()),
            email,
            rating,
            comment: comment.trim().to_string(),
            location: location.trim().to_string(),
            target_id,
            created_at: Utc::now(),
        })
    }
}
