use tracing::{debug, error, info, warn};

use crate::cancel::CancelFlag;
use crate::catalog::{CatalogError, WorkerCatalog};
use crate::deletion::{errors::DeletionError, types::*};
use crate::index::{ResourceKey, ResourceUsage};
use crate::plan::DeletionPlan;

/// Carry out a deletion plan.
///
/// The worker script goes first. If it cannot be deleted nothing else is
/// touched. Each resource is then handled in plan order and independently of
/// the others: a failed delete is recorded and the batch continues. Calls are
/// never retried. A "not found" from the remote counts as deleted so that
/// re-running after a partial failure is safe.
///
/// In dry-run mode no remote call is made and the worker plus every planned
/// resource are reported as deleted.
pub fn execute_plan(
    catalog: &dyn WorkerCatalog,
    plan: &DeletionPlan,
    dry_run: bool,
    cancel: &CancelFlag,
) -> DeletionResult {
    let worker = plan.worker.name.as_str();
    info!(
        event = "core.deletion.execute_started",
        worker = worker,
        resources = plan.resources_to_delete.len(),
        delete_shared = plan.delete_shared,
        dry_run = dry_run
    );

    let mut result = DeletionResult::default();

    if dry_run {
        result.worker_deleted = true;
        result.resources_deleted = plan
            .resources_to_delete
            .iter()
            .map(|r| r.name.clone())
            .collect();
        result.success = true;
        info!(event = "core.deletion.dry_run_completed", worker = worker);
        return result;
    }

    if cancel.is_cancelled() {
        warn!(event = "core.deletion.cancelled_before_start", worker = worker);
        for resource in &plan.resources_to_delete {
            result.skip(&resource.name, SkipReason::Cancelled);
        }
        result.errors.push(DeletionError::Cancelled {
            remaining: plan.resources_to_delete.len(),
        });
        return result;
    }

    match delete_worker_script(catalog, worker) {
        Ok(()) => result.worker_deleted = true,
        Err(e) => {
            error!(
                event = "core.deletion.worker_failed",
                worker = worker,
                error = %e
            );
            result.errors.push(DeletionError::WorkerDeleteFailed {
                worker: worker.to_string(),
                source: e,
            });
            return result;
        }
    }

    for (position, resource) in plan.resources_to_delete.iter().enumerate() {
        if cancel.is_cancelled() {
            let remaining = &plan.resources_to_delete[position..];
            warn!(
                event = "core.deletion.cancelled",
                worker = worker,
                remaining = remaining.len()
            );
            for resource in remaining {
                result.skip(&resource.name, SkipReason::Cancelled);
            }
            result.errors.push(DeletionError::Cancelled {
                remaining: remaining.len(),
            });
            break;
        }

        if resource.risk_level.is_shared() && !plan.delete_shared {
            info!(
                event = "core.deletion.resource_skipped",
                resource = %resource.key,
                risk_level = %resource.risk_level
            );
            result.skip(&resource.name, SkipReason::Shared);
            continue;
        }

        match delete_resource(catalog, resource) {
            Ok(()) => {
                info!(
                    event = "core.deletion.resource_completed",
                    resource = %resource.key,
                    name = resource.name
                );
                result.resources_deleted.push(resource.name.clone());
            }
            Err(e) => {
                error!(
                    event = "core.deletion.resource_failed",
                    resource = %resource.key,
                    name = resource.name,
                    error = %e
                );
                result.skip(&resource.name, SkipReason::Failed);
                result.errors.push(DeletionError::ResourceDeleteFailed {
                    kind: resource.kind,
                    name: resource.name.clone(),
                    source: e,
                });
            }
        }
    }

    result.success = result.errors.is_empty();
    info!(
        event = "core.deletion.execute_completed",
        worker = worker,
        success = result.success,
        deleted = result.resources_deleted.len(),
        skipped = result.resources_skipped.len(),
        errors = result.errors.len()
    );
    result
}

/// Delete only the worker script, leaving its resources in place.
pub fn delete_worker_only(
    catalog: &dyn WorkerCatalog,
    worker_name: &str,
    dry_run: bool,
) -> Result<(), DeletionError> {
    info!(
        event = "core.deletion.worker_only_started",
        worker = worker_name,
        dry_run = dry_run
    );

    if dry_run {
        return Ok(());
    }

    delete_worker_script(catalog, worker_name).map_err(|e| {
        error!(
            event = "core.deletion.worker_failed",
            worker = worker_name,
            error = %e
        );
        DeletionError::WorkerDeleteFailed {
            worker: worker_name.to_string(),
            source: e,
        }
    })?;

    info!(event = "core.deletion.worker_only_completed", worker = worker_name);
    Ok(())
}

fn delete_worker_script(catalog: &dyn WorkerCatalog, worker_name: &str) -> Result<(), CatalogError> {
    tolerate_not_found(catalog.delete_worker(worker_name), worker_name)?;
    info!(event = "core.deletion.worker_completed", worker = worker_name);
    Ok(())
}

fn delete_resource(catalog: &dyn WorkerCatalog, resource: &ResourceUsage) -> Result<(), CatalogError> {
    let outcome = match &resource.key {
        ResourceKey::KvNamespace(id) => catalog.delete_kv_namespace(id),
        ResourceKey::Bucket(name) => catalog.delete_bucket(name),
        ResourceKey::Database(id) => catalog.delete_database(id),
        // Queues are left to their producers and consumers
        ResourceKey::Queue(_) => {
            debug!(event = "core.deletion.queue_retained", resource = %resource.key);
            Ok(())
        }
    };
    tolerate_not_found(outcome, resource.key.id())
}

/// Already gone counts as deleted.
fn tolerate_not_found(outcome: Result<(), CatalogError>, target: &str) -> Result<(), CatalogError> {
    match outcome {
        Err(e) if e.is_not_found() => {
            debug!(event = "core.deletion.already_gone", target = target);
            Ok(())
        }
        other => other,
    }
}
