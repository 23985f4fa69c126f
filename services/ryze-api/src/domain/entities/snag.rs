//! 开发者抢单记录

use chrono::{DateTime, Utc};
use ryze_common::{RequestId, SnagId, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnaggedRequest {
    pub id: SnagId,
    pub request_id: RequestId,
    pub developer_id: UserId,
    pub snagged_at: DateTime<Utc>,
    pub is_active: bool,
}

impl SnaggedRequest {
    pub fn new(request_id: RequestId, developer_id: UserId) -> Self {
        Self {
            id: SnagId::new(),
            request_id,
            developer_id,
            snagged_at: Utc::now(),
            is_active: true,
        }
    }

    pub fn reactivate(&mut self) {
        self.is_active = true;
        self.snagged_at = Utc::now();
    }

    pub fn remove(&mut self) {
        self.is_active = false;
    }
}
