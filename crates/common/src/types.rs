//! 通用类型定义

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 定义基于 UUID v7 的强类型 ID
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, From,
        )]
        #[display("{_0}")]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

define_id!(
    /// 用户 ID
    UserId
);
define_id!(
    /// 项目 ID
    ProjectId
);
define_id!(
    /// 需求 ID
    RequestId
);
define_id!(
    /// 评论 ID
    CommentId
);
define_id!(
    /// 会话 ID
    ConversationId
);
define_id!(
    /// 会话消息 ID
    MessageId
);
define_id!(
    /// 抢单记录 ID
    SnagId
);
define_id!(
    /// 开发者评分 ID
    RatingId
);
define_id!(
    /// 反馈 ID
    FeedbackId
);
define_id!(
    /// 运维手册（命令笔记）ID
    RunbookId
);
define_id!(
    /// 运维手册执行记录 ID
    ExecutionId
);

/// 分页参数（skip/limit 风格）
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    100
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
        }
    }
}

impl Pagination {
    pub fn new(skip: u32, limit: u32) -> Self {
        Self { skip, limit }
    }

    /// 将 limit 限制在 [1, max] 范围内
    pub fn clamped(self, max: u32) -> Self {
        Self {
            skip: self.skip,
            limit: self.limit.clamp(1, max),
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.skip)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_time_ordered() {
        let first = UserId::new();
        let second = UserId::new();
        assert!(first.0 < second.0);
    }

    #[test]
    fn test_id_roundtrip_through_string() {
        let id = RequestId::new();
        let parsed = RequestId::from_string(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_pagination_clamps_limit() {
        let page = Pagination::new(5, 1000).clamped(100);
        assert_eq!(page.limit, 100);
        assert_eq!(page.offset(), 5);

        let page = Pagination::new(0, 0).clamped(100);
        assert_eq!(page.limit, 1);
    }
}
