//! 需求评论：树状回复与投票

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use ryze_common::{CommentId, RequestId, UserId};
use ryze_errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::entities::{Comment, CommentVote, VoteDirection};
use crate::domain::repositories::{CommentRepository, RequestRepository, UserRepository};

use super::dto::UserSummary;
use super::request_service::load_viewable;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateComment {
    pub content: String,
    pub parent_id: Option<CommentId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentOut {
    pub id: CommentId,
    pub request_id: RequestId,
    pub parent_id: Option<CommentId>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub user: Option<UserSummary>,
    pub vote_count: i64,
    /// 调用者自己的投票
    pub user_vote: Option<i16>,
    pub replies: Vec<CommentOut>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteOut {
    pub comment_id: CommentId,
    pub vote_count: i64,
    pub user_vote: Option<i16>,
}

/// 组装评论树
struct CommentTree {
    children: HashMap<Option<CommentId>, Vec<Comment>>,
    users: HashMap<UserId, UserSummary>,
    votes: HashMap<CommentId, i64>,
    own_votes: HashMap<CommentId, i16>,
}

impl CommentTree {
    fn build(
        comments: Vec<Comment>,
        users: HashMap<UserId, UserSummary>,
        all_votes: &[CommentVote],
        viewer: Option<&UserId>,
    ) -> Vec<CommentOut> {
        let mut children: HashMap<Option<CommentId>, Vec<Comment>> = HashMap::new();
        for comment in comments {
            children.entry(comment.parent_id).or_default().push(comment);
        }

        let mut votes: HashMap<CommentId, i64> = HashMap::new();
        let mut own_votes = HashMap::new();
        for vote in all_votes {
            *votes.entry(vote.comment_id).or_insert(0) += i64::from(vote.vote_type);
            if Some(&vote.user_id) == viewer {
                own_votes.insert(vote.comment_id, vote.vote_type);
            }
        }

        let mut tree = Self {
            children,
            users,
            votes,
            own_votes,
        };
        tree.render(None)
    }

    fn render(&mut self, parent: Option<CommentId>) -> Vec<CommentOut> {
        let comments = self.children.remove(&parent).unwrap_or_default();
        comments
            .into_iter()
            .map(|c| CommentOut {
                replies: self.render(Some(c.id)),
                user: self.users.get(&c.user_id).cloned(),
                vote_count: self.votes.get(&c.id).copied().unwrap_or(0),
                user_vote: self.own_votes.get(&c.id).copied(),
                id: c.id,
                request_id: c.request_id,
                parent_id: c.parent_id,
                content: c.content,
                created_at: c.created_at,
                updated_at: c.updated_at,
            })
            .collect()
    }
}

pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    requests: Arc<dyn RequestRepository>,
    users: Arc<dyn UserRepository>,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentRepository>,
        requests: Arc<dyn RequestRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            comments,
            requests,
            users,
        }
    }

    pub async fn create(
        &self,
        request_id: &RequestId,
        author: &UserId,
        input: CreateComment,
    ) -> AppResult<CommentOut> {
        load_viewable(self.requests.as_ref(), request_id, Some(author)).await?;

        if let Some(parent_id) = &input.parent_id {
            let parent = self
                .comments
                .find_by_id(parent_id)
                .await?
                .ok_or_else(|| AppError::not_found("Parent comment not found"))?;
            if parent.request_id != *request_id {
                return Err(AppError::validation(
                    "Parent comment belongs to a different request",
                ));
            }
        }

        let comment = Comment::new(*request_id, *author, input.parent_id, &input.content)?;
        self.comments.save(&comment).await?;

        let user = self.users.find_by_id(author).await?.map(|u| UserSummary::brief(&u));
        info!(comment_id = %comment.id, request_id = %request_id, "Comment created");

        Ok(CommentOut {
            id: comment.id,
            request_id: comment.request_id,
            parent_id: comment.parent_id,
            content: comment.content,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            user,
            vote_count: 0,
            user_vote: None,
            replies: Vec::new(),
        })
    }

    /// 顶层评论及其嵌套回复
    pub async fn list(
        &self,
        request_id: &RequestId,
        viewer: Option<&UserId>,
    ) -> AppResult<Vec<CommentOut>> {
        load_viewable(self.requests.as_ref(), request_id, viewer).await?;

        let comments = self.comments.list_by_request(request_id).await?;
        let votes = self.comments.list_votes_for_request(request_id).await?;

        let mut author_ids: Vec<UserId> = comments.iter().map(|c| c.user_id).collect();
        author_ids.sort();
        author_ids.dedup();
        let users = if author_ids.is_empty() {
            HashMap::new()
        } else {
            self.users
                .find_by_ids(&author_ids)
                .await?
                .iter()
                .map(|u| (u.id, UserSummary::brief(u)))
                .collect()
        };

        Ok(CommentTree::build(comments, users, &votes, viewer))
    }

    /// vote_type 为 0 时撤销投票
    pub async fn vote(
        &self,
        comment_id: &CommentId,
        voter: &UserId,
        vote_type: i16,
    ) -> AppResult<VoteOut> {
        let direction = VoteDirection::from_value(vote_type)?;
        let comment = self.find(comment_id).await?;
        load_viewable(self.requests.as_ref(), &comment.request_id, Some(voter)).await?;

        match direction {
            Some(direction) => {
                let vote = CommentVote {
                    user_id: *voter,
                    comment_id: comment.id,
                    vote_type: direction.value(),
                };
                self.comments.upsert_vote(&vote).await?;
            }
            None => self.comments.delete_vote(voter, &comment.id).await?,
        }

        Ok(VoteOut {
            comment_id: comment.id,
            vote_count: self.comments.vote_count(&comment.id).await?,
            user_vote: direction.map(|d| d.value()),
        })
    }

    pub async fn delete(&self, comment_id: &CommentId, user_id: &UserId) -> AppResult<()> {
        let comment = self.find(comment_id).await?;
        if comment.user_id != *user_id {
            return Err(AppError::forbidden("Only the author can delete this comment"));
        }
        self.comments.delete_with_replies(&comment.id).await?;
        info!(comment_id = %comment_id, "Comment deleted");
        Ok(())
    }

    async fn find(&self, id: &CommentId) -> AppResult<Comment> {
        self.comments
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Comment not found"))
    }
}
