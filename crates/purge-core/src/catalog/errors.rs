//! Remote catalog error types.

use crate::errors::PurgeError;

/// Errors returned by a [`WorkerCatalog`](super::WorkerCatalog).
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Not authorized: {message}")]
    NotAuthorized { message: String },

    #[error("Account '{account_id}' not found")]
    AccountNotFound { account_id: String },

    #[error("Worker '{name}' not found")]
    WorkerNotFound { name: String },

    #[error("Resource '{resource}' not found")]
    NotFound { resource: String },

    #[error("Network error: {message}")]
    TransientNetwork { message: String },

    #[error("Remote API error (HTTP {status}): {message}")]
    RemoteError { status: u16, message: String },

    #[error("Invalid API response: {message}")]
    InvalidResponse { message: String },

    #[error("Invalid API endpoint '{url}'")]
    InvalidEndpoint { url: String },

    #[error("No accounts are accessible with this API token")]
    NoAccounts,

    #[error("{count} accounts are accessible with this API token; specify --account-id")]
    AmbiguousAccount { count: usize },

    #[error("Missing API credentials: set {variable}")]
    MissingCredentials { variable: &'static str },
}

impl CatalogError {
    /// Whether the remote reported the target as already absent.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CatalogError::NotFound { .. } | CatalogError::WorkerNotFound { .. }
        )
    }
}

impl PurgeError for CatalogError {
    fn error_code(&self) -> &'static str {
        match self {
            CatalogError::NotAuthorized { .. } => "CATALOG_NOT_AUTHORIZED",
            CatalogError::AccountNotFound { .. } => "CATALOG_ACCOUNT_NOT_FOUND",
            CatalogError::WorkerNotFound { .. } => "CATALOG_WORKER_NOT_FOUND",
            CatalogError::NotFound { .. } => "CATALOG_NOT_FOUND",
            CatalogError::TransientNetwork { .. } => "CATALOG_TRANSIENT_NETWORK",
            CatalogError::RemoteError { .. } => "CATALOG_REMOTE_ERROR",
            CatalogError::InvalidResponse { .. } => "CATALOG_INVALID_RESPONSE",
            CatalogError::InvalidEndpoint { .. } => "CATALOG_INVALID_ENDPOINT",
            CatalogError::NoAccounts => "CATALOG_NO_ACCOUNTS",
            CatalogError::AmbiguousAccount { .. } => "CATALOG_AMBIGUOUS_ACCOUNT",
            CatalogError::MissingCredentials { .. } => "CATALOG_MISSING_CREDENTIALS",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            CatalogError::NotAuthorized { .. }
                | CatalogError::AccountNotFound { .. }
                | CatalogError::WorkerNotFound { .. }
                | CatalogError::NoAccounts
                | CatalogError::AmbiguousAccount { .. }
                | CatalogError::MissingCredentials { .. }
        )
    }
}
