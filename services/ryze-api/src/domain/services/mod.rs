//! 领域服务

mod runbook_step;
mod sensitive_content;

pub use runbook_step::*;
pub use sensitive_content::*;
