use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use tracing::{debug, error, info, warn};

use crate::cancel::CancelFlag;
use crate::catalog::{Binding, CatalogError, Worker, WorkerCatalog};
use crate::index::{errors::ScanError, types::*};

/// Callback invoked from pool threads after each binding fetch completes.
pub type ProgressFn<'a> = &'a (dyn Fn(&ScanProgress) + Sync);

/// Build the index from workers whose bindings are already known.
///
/// Pure and deterministic: the same input always yields the same index.
pub fn build_resource_index(workers: &[Worker]) -> ResourceIndex {
    let mut index = ResourceIndex::new();
    for worker in workers {
        index.record_worker(&worker.name, &worker.bindings);
    }
    index
}

enum FetchOutcome {
    Fetched {
        worker: String,
        bindings: Vec<Binding>,
    },
    Failed {
        worker: String,
        error: CatalogError,
    },
    NotDispatched {
        worker: String,
    },
}

/// Scan every worker in the account and index the resources they bind.
///
/// Binding fetches run on a bounded pool. Their results are collected and
/// merged into the index sequentially, so the index only ever has one writer.
/// A worker whose bindings cannot be read is left out of the index and listed
/// in [`ScanReport::unscanned`]; only a failure to list workers aborts the scan.
pub fn scan_account(
    catalog: &dyn WorkerCatalog,
    options: &ScanOptions,
    progress: Option<ProgressFn<'_>>,
    cancel: &CancelFlag,
) -> Result<ScanReport, ScanError> {
    info!(
        event = "core.scan.started",
        concurrency = options.concurrency
    );

    let workers = catalog.list_workers().map_err(|e| {
        error!(event = "core.scan.list_workers_failed", error = %e);
        ScanError::ListWorkersFailed { source: e }
    })?;

    let total = workers.len();
    info!(event = "core.scan.workers_listed", count = total);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.concurrency.max(1))
        .build()
        .map_err(|e| ScanError::PoolBuildFailed {
            message: e.to_string(),
        })?;

    let completed = AtomicUsize::new(0);
    let outcomes: Vec<FetchOutcome> = pool.install(|| {
        workers
            .par_iter()
            .map(|summary| {
                let worker = summary.name.clone();
                if cancel.is_cancelled() {
                    return FetchOutcome::NotDispatched { worker };
                }

                let outcome = match catalog.get_worker_bindings(&worker) {
                    Ok(bindings) => FetchOutcome::Fetched { worker, bindings },
                    // Deleted between listing and fetch: it references nothing now
                    Err(CatalogError::WorkerNotFound { .. }) => {
                        debug!(event = "core.scan.worker_vanished", worker = worker);
                        FetchOutcome::Fetched {
                            worker,
                            bindings: Vec::new(),
                        }
                    }
                    Err(error) => FetchOutcome::Failed { worker, error },
                };

                if let Some(notify) = progress {
                    let current = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    notify(&ScanProgress {
                        current,
                        total,
                        worker_name: summary.name.clone(),
                    });
                }

                outcome
            })
            .collect()
    });

    let mut report = ScanReport::default();
    for outcome in outcomes {
        match outcome {
            FetchOutcome::Fetched { worker, bindings } => {
                report.index.record_worker(&worker, &bindings);
                report.scanned.push(worker);
            }
            FetchOutcome::Failed { worker, error } => {
                warn!(
                    event = "core.scan.worker_skipped",
                    worker = worker,
                    error = %error
                );
                report.unscanned.push(worker);
            }
            FetchOutcome::NotDispatched { worker } => {
                report.cancelled = true;
                report.unscanned.push(worker);
            }
        }
    }

    if report.cancelled {
        warn!(
            event = "core.scan.cancelled",
            scanned = report.scanned.len(),
            not_scanned = report.unscanned.len()
        );
    }

    info!(
        event = "core.scan.completed",
        resources = report.index.len(),
        scanned = report.scanned.len(),
        unscanned = report.unscanned.len()
    );

    Ok(report)
}
