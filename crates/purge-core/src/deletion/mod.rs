pub mod errors;
pub mod handler;
pub mod types;

pub use errors::DeletionError;
pub use handler::{delete_worker_only, execute_plan};
pub use types::{DeletionResult, SkipReason, SkippedResource};
