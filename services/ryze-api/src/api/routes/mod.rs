//! HTTP 路由

pub mod accounts;
pub mod comments;
pub mod conversations;
pub mod feedback;
pub mod meta;
pub mod profiles;
pub mod projects;
pub mod ratings;
pub mod requests;
pub mod runbooks;
pub mod snags;
