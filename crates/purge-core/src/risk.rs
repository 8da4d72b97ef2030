//! Risk classification of a resource relative to the worker being deleted.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Minimum number of other workers for [`RiskLevel::Caution`].
pub const CAUTION_MIN_OTHER_WORKERS: usize = 1;

/// Minimum number of other workers for [`RiskLevel::Danger`].
pub const DANGER_MIN_OTHER_WORKERS: usize = 3;

/// How many other workers would be affected by deleting a resource.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// No other worker references the resource.
    #[default]
    Safe,
    /// One or two other workers reference it.
    Caution,
    /// Three or more other workers reference it.
    Danger,
}

impl RiskLevel {
    /// Tier for a given number of distinct other workers.
    pub fn from_other_count(other_workers: usize) -> Self {
        if other_workers >= DANGER_MIN_OTHER_WORKERS {
            RiskLevel::Danger
        } else if other_workers >= CAUTION_MIN_OTHER_WORKERS {
            RiskLevel::Caution
        } else {
            RiskLevel::Safe
        }
    }

    pub fn is_shared(&self) -> bool {
        *self > RiskLevel::Safe
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::Safe => "safe",
            RiskLevel::Caution => "caution",
            RiskLevel::Danger => "danger",
        };
        f.pad(label)
    }
}

/// Classify a resource from the workers referencing it.
///
/// Counts distinct worker names other than `target_worker`. The target never
/// counts against itself, and a worker bound to the same resource twice counts
/// once.
pub fn classify<S: AsRef<str>>(used_by: &[S], target_worker: &str) -> RiskLevel {
    let others: HashSet<&str> = used_by
        .iter()
        .map(|worker| worker.as_ref())
        .filter(|worker| *worker != target_worker)
        .collect();

    RiskLevel::from_other_count(others.len())
}
