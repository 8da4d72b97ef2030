use serde::{Deserialize, Serialize};

use crate::catalog::Worker;
use crate::index::ResourceUsage;
use crate::risk::RiskLevel;

/// What a run intends to delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionPlan {
    /// Snapshot of the target worker at planning time.
    pub worker: Worker,
    pub resources_to_delete: Vec<ResourceUsage>,
    /// True iff an included resource is referenced by another worker.
    pub has_shared_resources: bool,
    /// Resources above Safe were never included.
    pub exclusive_only: bool,
    /// Whether included Caution/Danger resources are deleted or only reported.
    pub delete_shared: bool,
}

impl DeletionPlan {
    pub fn shared_resources(&self) -> impl Iterator<Item = &ResourceUsage> {
        self.resources_to_delete
            .iter()
            .filter(|r| r.risk_level.is_shared())
    }

    pub fn risk_summary(&self) -> RiskSummary {
        let mut summary = RiskSummary::default();
        for resource in &self.resources_to_delete {
            match resource.risk_level {
                RiskLevel::Safe => summary.safe += 1,
                RiskLevel::Caution => summary.caution += 1,
                RiskLevel::Danger => summary.danger += 1,
            }
        }
        summary
    }

    /// Human-readable warnings, most severe first.
    pub fn warning_messages(&self) -> Vec<String> {
        let mut shared: Vec<&ResourceUsage> = self.shared_resources().collect();
        shared.sort_by(|a, b| b.risk_level.cmp(&a.risk_level));

        shared
            .into_iter()
            .map(|resource| {
                let others: Vec<&str> = resource.other_users(&self.worker.name).collect();
                let action = if self.delete_shared {
                    "will be deleted"
                } else {
                    "will be skipped"
                };
                format!(
                    "{} '{}' is also used by {} ({}); {}",
                    resource.kind,
                    resource.name,
                    others.join(", "),
                    resource.risk_level,
                    action
                )
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskSummary {
    pub safe: usize,
    pub caution: usize,
    pub danger: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct AnalyzeOptions {
    pub exclusive_only: bool,
    /// Plan from the target's bindings alone. Every resource is then Safe.
    pub skip_dependency_check: bool,
    pub concurrency: usize,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            exclusive_only: false,
            skip_dependency_check: false,
            concurrency: crate::config::defaults::default_scan_concurrency(),
        }
    }
}

/// Plan plus what the scan could not see.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub plan: DeletionPlan,
    /// Workers missing from the index. A resource they share with the target
    /// is classified as if they did not exist.
    pub unscanned_workers: Vec<String>,
    pub dependency_check_skipped: bool,
}
