//! Remote catalog trait definition.

use crate::catalog::errors::CatalogError;
use crate::catalog::types::{Binding, ResourceKind, WorkerSummary};

/// Trait defining the remote worker/resource catalog.
///
/// Implementations are shared across the scan thread pool, hence
/// `Send + Sync`. Every call is made at most once per item per run; retries
/// are the caller's business.
pub trait WorkerCatalog: Send + Sync {
    /// List every worker in the account.
    fn list_workers(&self) -> Result<Vec<WorkerSummary>, CatalogError>;

    /// Fetch the declared bindings of one worker.
    ///
    /// Returns [`CatalogError::WorkerNotFound`] when the worker no longer exists.
    fn get_worker_bindings(&self, worker_name: &str) -> Result<Vec<Binding>, CatalogError>;

    fn delete_worker(&self, worker_name: &str) -> Result<(), CatalogError>;

    fn delete_kv_namespace(&self, namespace_id: &str) -> Result<(), CatalogError>;

    fn delete_bucket(&self, bucket_name: &str) -> Result<(), CatalogError>;

    fn delete_database(&self, database_id: &str) -> Result<(), CatalogError>;

    /// Resolve a human-readable name for a resource.
    ///
    /// Returns `Ok(None)` for kinds without a name lookup.
    fn lookup_display_name(
        &self,
        kind: ResourceKind,
        id: &str,
    ) -> Result<Option<String>, CatalogError>;
}
