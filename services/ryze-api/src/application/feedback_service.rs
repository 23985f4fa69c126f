//! 匿名反馈

use std::sync::Arc;

use ryze_errors::AppResult;
use serde::Deserialize;
use tracing::info;

use crate::domain::entities::Feedback;
use crate::domain::repositories::FeedbackRepository;

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitFeedback {
    pub name: Option<String>,
    pub email: Option<String>,
    pub rating: i16,
    pub comment: String,
    pub location: String,
    pub target_id: Option<String>,
}

pub struct FeedbackService {
    feedback: Arc<dyn FeedbackRepository>,
}

impl FeedbackService {
    pub fn new(feedback: Arc<dyn FeedbackRepository>) -> Self {
        Self { feedback }
    }

    pub async fn submit(&self, input: SubmitFeedback) -> AppResult<Feedback> {
        let feedback = Feedback::new(
            input.name,
            input.email,
            input.rating,
            &input.comment,
            &input.location,
            input.target_id,
        )?;
        self.feedback.save(&feedback).await?;
        info!(feedback_id = %feedback.id, rating = feedback.rating, "Feedback received");
        Ok(feedback)
    }

    pub async fn list(&self) -> AppResult<Vec<Feedback>> {
        self.feedback.list_all().await
    }
}
