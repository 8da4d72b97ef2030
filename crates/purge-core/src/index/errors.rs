use crate::catalog::CatalogError;
use crate::errors::PurgeError;

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Failed to list workers: {source}")]
    ListWorkersFailed {
        #[source]
        source: CatalogError,
    },

    #[error("Failed to start scan worker pool: {message}")]
    PoolBuildFailed { message: String },
}

impl PurgeError for ScanError {
    fn error_code(&self) -> &'static str {
        match self {
            ScanError::ListWorkersFailed { .. } => "SCAN_LIST_WORKERS_FAILED",
            ScanError::PoolBuildFailed { .. } => "SCAN_POOL_BUILD_FAILED",
        }
    }

    fn is_user_error(&self) -> bool {
        match self {
            ScanError::ListWorkersFailed { source } => source.is_user_error(),
            ScanError::PoolBuildFailed { .. } => false,
        }
    }
}
