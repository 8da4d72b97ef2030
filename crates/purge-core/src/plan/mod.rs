pub mod errors;
pub mod handler;
pub mod types;

// Public API exports
pub use errors::PlanError;
pub use handler::{analyze_worker, build_plan, enrich_display_names, fetch_target_worker};
pub use types::{AnalyzeOptions, Analysis, DeletionPlan, RiskSummary};
