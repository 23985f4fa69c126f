//! 评论 Repository trait

use async_trait::async_trait;
use ryze_common::{CommentId, RequestId, UserId};
use ryze_errors::AppResult;

use crate::domain::entities::{Comment, CommentVote};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn find_by_id(&self, id: &CommentId) -> AppResult<Option<Comment>>;

    async fn save(&self, comment: &Comment) -> AppResult<()>;

    /// 需求下全部评论（按创建时间升序）
    async fn list_by_request(&self, request_id: &RequestId) -> AppResult<Vec<Comment>>;

    /// 删除评论及其全部回复
    async fn delete_with_replies(&self, id: &CommentId) -> AppResult<()>;

    /// 需求下全部评论的投票
    async fn list_votes_for_request(&self, request_id: &RequestId) -> AppResult<Vec<CommentVote>>;

    async fn upsert_vote(&self, vote: &CommentVote) -> AppResult<()>;

    async fn delete_vote(&self, user_id: &UserId, comment_id: &CommentId) -> AppResult<()>;

    /// 投票总和
    async fn vote_count(&self, comment_id: &CommentId) -> AppResult<i64>;
}
