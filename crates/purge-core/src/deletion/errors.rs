use crate::catalog::{CatalogError, ResourceKind};
use crate::errors::PurgeError;

#[derive(Debug, thiserror::Error)]
pub enum DeletionError {
    #[error("Failed to delete worker '{worker}': {source}")]
    WorkerDeleteFailed {
        worker: String,
        #[source]
        source: CatalogError,
    },

    #[error("Failed to delete {kind} '{name}': {source}")]
    ResourceDeleteFailed {
        kind: ResourceKind,
        name: String,
        #[source]
        source: CatalogError,
    },

    #[error("Deletion cancelled with {remaining} resource(s) not attempted")]
    Cancelled { remaining: usize },
}

impl PurgeError for DeletionError {
    fn error_code(&self) -> &'static str {
        match self {
            DeletionError::WorkerDeleteFailed { .. } => "DELETION_WORKER_FAILED",
            DeletionError::ResourceDeleteFailed { .. } => "DELETION_RESOURCE_FAILED",
            DeletionError::Cancelled { .. } => "DELETION_CANCELLED",
        }
    }

    fn is_user_error(&self) -> bool {
        match self {
            DeletionError::WorkerDeleteFailed { source, .. }
            | DeletionError::ResourceDeleteFailed { source, .. } => source.is_user_error(),
            DeletionError::Cancelled { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_delete_failed_display() {
        let error = DeletionError::ResourceDeleteFailed {
            kind: ResourceKind::Database,
            name: "billing-db".to_string(),
            source: CatalogError::RemoteError {
                status: 400,
                message: "database is locked".to_string(),
            },
        };
        assert_eq!(
            error.to_string(),
            "Failed to delete D1 database 'billing-db': Remote API error (HTTP 400): database is locked"
        );
        assert_eq!(error.error_code(), "DELETION_RESOURCE_FAILED");
    }

    #[test]
    fn test_cancelled_is_user_error() {
        let error = DeletionError::Cancelled { remaining: 2 };
        assert!(error.is_user_error());
        assert_eq!(error.error_code(), "DELETION_CANCELLED");
    }
}
