pub mod config;
pub mod error;
pub mod git;
pub mod repo_status;
pub mod sweep;
pub mod sync_status;
