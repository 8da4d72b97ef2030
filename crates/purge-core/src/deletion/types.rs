use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;

use crate::deletion::errors::DeletionError;
use crate::errors::PurgeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Referenced by another worker and the plan does not delete shared resources.
    Shared,
    /// The delete call failed; the matching error is in `DeletionResult::errors`.
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedResource {
    pub name: String,
    pub reason: SkipReason,
}

/// Terminal record of one deletion run.
#[derive(Debug, Default, Serialize)]
pub struct DeletionResult {
    pub success: bool,
    pub worker_deleted: bool,
    /// Display names, in plan order.
    pub resources_deleted: Vec<String>,
    pub resources_skipped: Vec<SkippedResource>,
    #[serde(serialize_with = "serialize_errors")]
    pub errors: Vec<DeletionError>,
}

impl DeletionResult {
    pub(crate) fn skip(&mut self, name: &str, reason: SkipReason) {
        self.resources_skipped.push(SkippedResource {
            name: name.to_string(),
            reason,
        });
    }

    pub fn skipped_for(&self, reason: SkipReason) -> impl Iterator<Item = &str> {
        self.resources_skipped
            .iter()
            .filter(move |s| s.reason == reason)
            .map(|s| s.name.as_str())
    }
}

#[derive(Serialize)]
struct ErrorRecord {
    code: &'static str,
    message: String,
}

fn serialize_errors<S: Serializer>(
    errors: &[DeletionError],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(errors.len()))?;
    for error in errors {
        seq.serialize_element(&ErrorRecord {
            code: error.error_code(),
            message: error.to_string(),
        })?;
    }
    seq.end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogError;

    #[test]
    fn test_errors_serialize_as_code_and_message() {
        let mut result = DeletionResult {
            worker_deleted: true,
            resources_deleted: vec!["billing-db".to_string()],
            errors: vec![DeletionError::WorkerDeleteFailed {
                worker: "billing-svc".to_string(),
                source: CatalogError::TransientNetwork {
                    message: "connection reset".to_string(),
                },
            }],
            ..DeletionResult::default()
        };
        result.skip("CACHE", SkipReason::Shared);

        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["errors"][0]["code"], "DELETION_WORKER_FAILED");
        assert_eq!(
            json["errors"][0]["message"],
            "Failed to delete worker 'billing-svc': Network error: connection reset"
        );
        assert_eq!(json["resources_skipped"][0]["reason"], "shared");
        assert_eq!(json["resources_deleted"][0], "billing-db");
    }

    #[test]
    fn test_skipped_for_filters_by_reason() {
        let mut result = DeletionResult::default();
        result.skip("CACHE", SkipReason::Shared);
        result.skip("DB", SkipReason::Failed);

        assert_eq!(result.skipped_for(SkipReason::Shared).collect::<Vec<_>>(), vec!["CACHE"]);
        assert_eq!(result.skipped_for(SkipReason::Failed).collect::<Vec<_>>(), vec!["DB"]);
    }
}
