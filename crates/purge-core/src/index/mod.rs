pub mod errors;
pub mod handler;
pub mod types;

// Public API exports
pub use errors::ScanError;
pub use handler::{ProgressFn, build_resource_index, scan_account};
pub use types::{ResourceIndex, ResourceKey, ResourceUsage, ScanOptions, ScanProgress, ScanReport};
