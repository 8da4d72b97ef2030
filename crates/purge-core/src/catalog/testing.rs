//! In-memory catalog that records every call, for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::cancel::CancelFlag;
use crate::catalog::errors::CatalogError;
use crate::catalog::traits::WorkerCatalog;
use crate::catalog::types::{Binding, BindingKind, ResourceKind, WorkerSummary};

#[derive(Debug, Clone, Copy)]
pub enum Failure {
    NotFound,
    Remote,
    Transient,
}

impl Failure {
    fn into_error(self, target: &str) -> CatalogError {
        match self {
            Failure::NotFound => CatalogError::NotFound {
                resource: target.to_string(),
            },
            Failure::Remote => CatalogError::RemoteError {
                status: 500,
                message: format!("cannot delete {}", target),
            },
            Failure::Transient => CatalogError::TransientNetwork {
                message: "connection reset".to_string(),
            },
        }
    }
}

#[derive(Default)]
pub struct FakeCatalog {
    workers: Vec<(String, Vec<Binding>)>,
    unreadable: HashSet<String>,
    failures: HashMap<String, Failure>,
    display_names: HashMap<String, String>,
    list_failure: Option<Failure>,
    cancel_on: Option<(String, CancelFlag)>,
    calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_worker(mut self, name: &str, bindings: Vec<Binding>) -> Self {
        self.workers.push((name.to_string(), bindings));
        self
    }

    /// Binding fetches for this worker fail with a transient error.
    pub fn with_unreadable_worker(mut self, name: &str) -> Self {
        self.unreadable.insert(name.to_string());
        self
    }

    /// Deletes (and lookups) targeting `id` fail.
    pub fn with_failure(mut self, id: &str, failure: Failure) -> Self {
        self.failures.insert(id.to_string(), failure);
        self
    }

    pub fn with_display_name(mut self, id: &str, name: &str) -> Self {
        self.display_names.insert(id.to_string(), name.to_string());
        self
    }

    pub fn with_list_failure(mut self, failure: Failure) -> Self {
        self.list_failure = Some(failure);
        self
    }

    /// Sets `flag` once a call targeting `id` has been recorded.
    pub fn with_cancel_on(mut self, id: &str, flag: &CancelFlag) -> Self {
        self.cancel_on = Some((id.to_string(), flag.clone()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded calls whose operation starts with `delete_`.
    pub fn delete_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with("delete_"))
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn cancel_if_targeted(&self, id: &str) {
        if let Some((target, flag)) = &self.cancel_on {
            if target == id {
                flag.cancel();
            }
        }
    }

    fn delete(&self, operation: &str, id: &str) -> Result<(), CatalogError> {
        self.record(format!("{}:{}", operation, id));
        self.cancel_if_targeted(id);
        match self.failures.get(id) {
            Some(failure) => Err(failure.into_error(id)),
            None => Ok(()),
        }
    }
}

impl WorkerCatalog for FakeCatalog {
    fn list_workers(&self) -> Result<Vec<WorkerSummary>, CatalogError> {
        self.record("list_workers".to_string());
        if let Some(failure) = self.list_failure {
            return Err(failure.into_error("account"));
        }
        Ok(self
            .workers
            .iter()
            .map(|(name, _)| WorkerSummary::new(name.clone()))
            .collect())
    }

    fn get_worker_bindings(&self, worker_name: &str) -> Result<Vec<Binding>, CatalogError> {
        self.record(format!("get_worker_bindings:{}", worker_name));
        self.cancel_if_targeted(worker_name);
        if self.unreadable.contains(worker_name) {
            return Err(Failure::Transient.into_error(worker_name));
        }
        self.workers
            .iter()
            .find(|(name, _)| name == worker_name)
            .map(|(_, bindings)| bindings.clone())
            .ok_or_else(|| CatalogError::WorkerNotFound {
                name: worker_name.to_string(),
            })
    }

    fn delete_worker(&self, worker_name: &str) -> Result<(), CatalogError> {
        self.record(format!("delete_worker:{}", worker_name));
        self.cancel_if_targeted(worker_name);
        match self.failures.get(worker_name) {
            Some(Failure::NotFound) => Err(CatalogError::WorkerNotFound {
                name: worker_name.to_string(),
            }),
            Some(failure) => Err(failure.into_error(worker_name)),
            None => Ok(()),
        }
    }

    fn delete_kv_namespace(&self, namespace_id: &str) -> Result<(), CatalogError> {
        self.delete("delete_kv_namespace", namespace_id)
    }

    fn delete_bucket(&self, bucket_name: &str) -> Result<(), CatalogError> {
        self.delete("delete_bucket", bucket_name)
    }

    fn delete_database(&self, database_id: &str) -> Result<(), CatalogError> {
        self.delete("delete_database", database_id)
    }

    fn lookup_display_name(
        &self,
        kind: ResourceKind,
        id: &str,
    ) -> Result<Option<String>, CatalogError> {
        self.record(format!("lookup_display_name:{}", id));
        if !kind.supports_name_lookup() {
            return Ok(None);
        }
        if let Some(failure) = self.failures.get(id) {
            return Err(failure.into_error(id));
        }
        Ok(self.display_names.get(id).cloned())
    }
}

pub fn kv(name: &str, namespace_id: &str) -> Binding {
    Binding::new(
        name,
        BindingKind::KvNamespace {
            namespace_id: namespace_id.to_string(),
        },
    )
}

pub fn r2(name: &str, bucket_name: &str) -> Binding {
    Binding::new(
        name,
        BindingKind::R2Bucket {
            bucket_name: bucket_name.to_string(),
        },
    )
}

pub fn d1(name: &str, database_id: &str) -> Binding {
    Binding::new(
        name,
        BindingKind::D1 {
            database_id: database_id.to_string(),
            database_name: None,
        },
    )
}

pub fn queue(name: &str, queue_name: &str) -> Binding {
    Binding::new(
        name,
        BindingKind::Queue {
            queue_name: queue_name.to_string(),
        },
    )
}

pub fn durable_object(name: &str, class_name: &str) -> Binding {
    Binding::new(
        name,
        BindingKind::DurableObjectNamespace {
            class_name: class_name.to_string(),
            script_name: None,
        },
    )
}

pub fn service(name: &str, target: &str) -> Binding {
    Binding::new(
        name,
        BindingKind::Service {
            service: target.to_string(),
        },
    )
}

pub fn secret(name: &str) -> Binding {
    Binding::new(name, BindingKind::SecretText)
}
