use std::collections::HashSet;

use tracing::{debug, error, info, warn};

use crate::cancel::CancelFlag;
use crate::catalog::{CatalogError, Worker, WorkerCatalog};
use crate::index::{self, ProgressFn, ResourceIndex, ResourceKey, ResourceUsage, ScanOptions};
use crate::plan::{errors::PlanError, types::*};
use crate::risk::classify;

/// Build the deletion plan for `target` from a whole-account index.
///
/// Each resource reachable from the target's bindings appears at most once,
/// in the order of its first binding. A resource missing from the index (for
/// example when the scan was skipped) is treated as used by the target alone.
/// With `exclusive_only`, resources referenced by any other worker are left
/// out and do not count towards `has_shared_resources`.
///
/// The returned plan has `delete_shared` unset; callers opt in explicitly.
pub fn build_plan(target: &Worker, index: &ResourceIndex, exclusive_only: bool) -> DeletionPlan {
    let mut seen: HashSet<ResourceKey> = HashSet::new();
    let mut resources_to_delete = Vec::new();
    let mut has_shared_resources = false;

    for binding in &target.bindings {
        let Some(key) = ResourceKey::from_binding(binding) else {
            continue;
        };
        if !seen.insert(key.clone()) {
            continue;
        }

        let mut usage = match index.get(&key) {
            Some(usage) => usage.clone(),
            None => {
                let mut usage = ResourceUsage::from_binding(key, binding);
                usage.add_user(&target.name);
                usage
            }
        };
        usage.risk_level = classify(&usage.used_by, &target.name);

        if exclusive_only && usage.risk_level.is_shared() {
            debug!(
                event = "core.plan.shared_resource_excluded",
                worker = target.name,
                resource = %usage.key,
                risk_level = %usage.risk_level
            );
            continue;
        }

        has_shared_resources |= usage.risk_level.is_shared();
        resources_to_delete.push(usage);
    }

    DeletionPlan {
        worker: target.clone(),
        resources_to_delete,
        has_shared_resources,
        exclusive_only,
        delete_shared: false,
    }
}

/// Replace provisional resource names with the names the catalog reports.
///
/// Best effort: a failed lookup keeps the provisional name.
pub fn enrich_display_names(plan: &mut DeletionPlan, catalog: &dyn WorkerCatalog) {
    for resource in plan
        .resources_to_delete
        .iter_mut()
        .filter(|r| r.name_is_provisional && r.kind.supports_name_lookup())
    {
        match catalog.lookup_display_name(resource.kind, resource.key.id()) {
            Ok(Some(name)) if !name.is_empty() => {
                debug!(
                    event = "core.plan.name_enriched",
                    resource = %resource.key,
                    name = name
                );
                resource.name = name;
                resource.name_is_provisional = false;
            }
            Ok(_) => {}
            Err(e) => {
                debug!(
                    event = "core.plan.name_lookup_failed",
                    resource = %resource.key,
                    error = %e
                );
            }
        }
    }
}

/// Fetch the worker being deleted along with its bindings.
///
/// The worker must appear in the account listing. A binding fetch that fails
/// for any reason other than the worker having vanished is an error: planning
/// on an empty binding list would orphan every resource the worker owns.
pub fn fetch_target_worker(
    catalog: &dyn WorkerCatalog,
    worker_name: &str,
) -> Result<Worker, PlanError> {
    let workers = catalog
        .list_workers()
        .map_err(|e| PlanError::WorkerLookupFailed {
            name: worker_name.to_string(),
            source: e,
        })?;

    if !workers.iter().any(|w| w.name == worker_name) {
        return Err(PlanError::WorkerNotFound {
            name: worker_name.to_string(),
        });
    }

    let bindings = match catalog.get_worker_bindings(worker_name) {
        Ok(bindings) => bindings,
        Err(CatalogError::WorkerNotFound { .. }) => {
            warn!(
                event = "core.plan.target_vanished",
                worker = worker_name
            );
            Vec::new()
        }
        Err(e) => {
            return Err(PlanError::WorkerLookupFailed {
                name: worker_name.to_string(),
                source: e,
            });
        }
    };

    Ok(Worker::new(worker_name, bindings))
}

/// Analyze a worker end to end: fetch it, scan the account, plan, enrich.
pub fn analyze_worker(
    catalog: &dyn WorkerCatalog,
    worker_name: &str,
    options: &AnalyzeOptions,
    progress: Option<ProgressFn<'_>>,
    cancel: &CancelFlag,
) -> Result<Analysis, PlanError> {
    info!(
        event = "core.plan.analysis_started",
        worker = worker_name,
        exclusive_only = options.exclusive_only,
        skip_dependency_check = options.skip_dependency_check
    );

    let target = fetch_target_worker(catalog, worker_name).map_err(|e| {
        error!(
            event = "core.plan.target_fetch_failed",
            worker = worker_name,
            error = %e
        );
        e
    })?;

    let (resource_index, unscanned_workers) = if options.skip_dependency_check {
        warn!(
            event = "core.plan.dependency_check_skipped",
            worker = worker_name
        );
        (ResourceIndex::new(), Vec::new())
    } else {
        let scan_options = ScanOptions {
            concurrency: options.concurrency,
        };
        let report = index::scan_account(catalog, &scan_options, progress, cancel)?;
        if report.cancelled {
            return Err(PlanError::Cancelled);
        }
        if !report.unscanned.is_empty() {
            warn!(
                event = "core.plan.partial_dependency_scan",
                worker = worker_name,
                unscanned = report.unscanned.len()
            );
        }
        (report.index, report.unscanned)
    };

    let mut plan = build_plan(&target, &resource_index, options.exclusive_only);
    enrich_display_names(&mut plan, catalog);

    let summary = plan.risk_summary();
    info!(
        event = "core.plan.analysis_completed",
        worker = worker_name,
        resources = plan.resources_to_delete.len(),
        safe = summary.safe,
        caution = summary.caution,
        danger = summary.danger
    );

    Ok(Analysis {
        plan,
        unscanned_workers,
        dependency_check_skipped: options.skip_dependency_check,
    })
}
