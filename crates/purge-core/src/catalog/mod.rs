pub mod cloudflare;
pub mod errors;
pub mod traits;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

// Public API exports
pub use cloudflare::{API_TOKEN_ENV, CloudflareCatalog, DEFAULT_API_BASE_URL, api_token_from_env};
pub use errors::CatalogError;
pub use traits::WorkerCatalog;
pub use types::{Binding, BindingKind, ResourceKind, Worker, WorkerSummary};
