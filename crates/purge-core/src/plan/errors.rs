use crate::catalog::CatalogError;
use crate::errors::PurgeError;
use crate::index::ScanError;

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("Worker '{name}' not found in account")]
    WorkerNotFound { name: String },

    #[error("Failed to look up worker '{name}': {source}")]
    WorkerLookupFailed {
        name: String,
        #[source]
        source: CatalogError,
    },

    #[error("Dependency scan failed: {source}")]
    ScanFailed {
        #[from]
        source: ScanError,
    },

    #[error("Analysis cancelled before the dependency scan finished")]
    Cancelled,
}

impl PurgeError for PlanError {
    fn error_code(&self) -> &'static str {
        match self {
            PlanError::WorkerNotFound { .. } => "PLAN_WORKER_NOT_FOUND",
            PlanError::WorkerLookupFailed { .. } => "PLAN_WORKER_LOOKUP_FAILED",
            PlanError::ScanFailed { .. } => "PLAN_SCAN_FAILED",
            PlanError::Cancelled => "PLAN_CANCELLED",
        }
    }

    fn is_user_error(&self) -> bool {
        match self {
            PlanError::WorkerNotFound { .. } | PlanError::Cancelled => true,
            PlanError::WorkerLookupFailed { source, .. } => source.is_user_error(),
            PlanError::ScanFailed { source } => source.is_user_error(),
        }
    }
}
