//! purge-core: Core library for deleting a Cloudflare worker together with
//! the resources it binds
//!
//! A run scans every worker in the account to learn which resources are
//! shared, plans the deletion with a risk level per resource, and executes
//! the plan worker-first.
//!
//! # Main Entry Points
//!
//! - [`plan`] - Analyze a worker and build its deletion plan
//! - [`deletion`] - Execute a plan or delete a worker script alone
//! - [`index`] - Whole-account resource usage scan
//! - [`catalog`] - Remote account access
//! - [`config`] - Configuration management

pub mod cancel;
pub mod catalog;
pub mod config;
pub mod deletion;
pub mod errors;
pub mod events;
pub mod index;
pub mod logging;
pub mod plan;
pub mod risk;

// Re-export commonly used types at crate root for convenience
pub use cancel::CancelFlag;
pub use catalog::{CatalogError, CloudflareCatalog, Worker, WorkerCatalog};
pub use config::PurgeConfig;
pub use deletion::{DeletionError, DeletionResult, SkipReason};
pub use index::{ResourceIndex, ResourceKey, ResourceUsage, ScanProgress};
pub use plan::{AnalyzeOptions, Analysis, DeletionPlan, PlanError, RiskSummary};
pub use risk::RiskLevel;

// Re-export handler modules as the primary API
pub use deletion::handler as deletion_ops;
pub use index::handler as index_ops;
pub use plan::handler as plan_ops;

// Re-export logging initialization
pub use logging::init_logging;
