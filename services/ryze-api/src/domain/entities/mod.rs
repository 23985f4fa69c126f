//! 领域实体

mod comment;
mod conversation;
mod feedback;
mod profile;
mod project;
mod rating;
mod request;
mod runbook;
mod snag;
mod user;

pub use comment::*;
pub use conversation::*;
pub use feedback::*;
pub use profile::*;
pub use project::*;
pub use rating::*;
pub use request::*;
pub use runbook::*;
pub use snag::*;
pub use user::*;
