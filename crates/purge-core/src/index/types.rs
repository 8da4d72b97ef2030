use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::catalog::types::{Binding, BindingKind, ResourceKind};
use crate::risk::RiskLevel;

/// Canonical cross-worker identity of a backing resource.
///
/// Derived only from the binding kind and its identifying field, never from
/// the worker-local binding name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ResourceKey {
    KvNamespace(String),
    Bucket(String),
    Database(String),
    Queue(String),
}

impl ResourceKey {
    /// Resolve the resource a binding points at.
    ///
    /// Durable object classes, service links, plain text, secrets and opaque
    /// kinds have no independently addressable store and yield `None`, as does
    /// a binding with an empty identifier.
    pub fn from_binding(binding: &Binding) -> Option<Self> {
        let key = match &binding.kind {
            BindingKind::KvNamespace { namespace_id } => {
                ResourceKey::KvNamespace(namespace_id.clone())
            }
            BindingKind::R2Bucket { bucket_name } => ResourceKey::Bucket(bucket_name.clone()),
            BindingKind::D1 { database_id, .. } => ResourceKey::Database(database_id.clone()),
            BindingKind::Queue { queue_name } => ResourceKey::Queue(queue_name.clone()),
            BindingKind::DurableObjectNamespace { .. }
            | BindingKind::Service { .. }
            | BindingKind::PlainText
            | BindingKind::SecretText
            | BindingKind::Other => return None,
        };

        if key.id().is_empty() {
            return None;
        }
        Some(key)
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceKey::KvNamespace(_) => ResourceKind::KvNamespace,
            ResourceKey::Bucket(_) => ResourceKind::Bucket,
            ResourceKey::Database(_) => ResourceKind::Database,
            ResourceKey::Queue(_) => ResourceKind::Queue,
        }
    }

    /// Identifier the remote API addresses the resource by.
    pub fn id(&self) -> &str {
        match self {
            ResourceKey::KvNamespace(id)
            | ResourceKey::Bucket(id)
            | ResourceKey::Database(id)
            | ResourceKey::Queue(id) => id,
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind().prefix(), self.id())
    }
}

/// Which workers reference one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceUsage {
    pub key: ResourceKey,
    pub kind: ResourceKind,
    /// Best-effort display name.
    pub name: String,
    /// Referencing workers in first-seen order, without duplicates.
    pub used_by: Vec<String>,
    pub risk_level: RiskLevel,
    /// Name is a stand-in (binding name) that a catalog lookup may improve.
    #[serde(skip)]
    pub name_is_provisional: bool,
}

impl ResourceUsage {
    /// Start tracking a resource from its first sighting.
    pub fn from_binding(key: ResourceKey, binding: &Binding) -> Self {
        let (name, name_is_provisional) = provisional_name(&key, binding);

        Self {
            kind: key.kind(),
            key,
            name,
            used_by: Vec::new(),
            risk_level: RiskLevel::Safe,
            name_is_provisional,
        }
    }

    pub fn id(&self) -> &str {
        self.key.id()
    }

    /// Record a referencing worker. Repeat sightings are ignored.
    pub fn add_user(&mut self, worker_name: &str) {
        if !self.used_by.iter().any(|w| w == worker_name) {
            self.used_by.push(worker_name.to_string());
        }
    }

    /// Referencing workers other than `target_worker`.
    pub fn other_users<'a>(&'a self, target_worker: &'a str) -> impl Iterator<Item = &'a str> {
        self.used_by
            .iter()
            .map(String::as_str)
            .filter(move |w| *w != target_worker)
    }
}

fn provisional_name(key: &ResourceKey, binding: &Binding) -> (String, bool) {
    let fallback = || {
        if binding.name.is_empty() {
            key.id().to_string()
        } else {
            binding.name.clone()
        }
    };

    match &binding.kind {
        BindingKind::R2Bucket { bucket_name } => (bucket_name.clone(), false),
        BindingKind::Queue { queue_name } => (queue_name.clone(), false),
        BindingKind::D1 {
            database_name: Some(database_name),
            ..
        } if !database_name.is_empty() => (database_name.clone(), false),
        // KV namespaces and unnamed databases only carry an id; the binding
        // name stands in until enrichment.
        _ => (fallback(), true),
    }
}

/// Whole-account map from resource identity to its usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceIndex {
    entries: BTreeMap<ResourceKey, ResourceUsage>,
}

impl ResourceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one worker's bindings into the index.
    pub fn record_worker(&mut self, worker_name: &str, bindings: &[Binding]) {
        for binding in bindings {
            let Some(key) = ResourceKey::from_binding(binding) else {
                continue;
            };

            self.entries
                .entry(key.clone())
                .or_insert_with(|| ResourceUsage::from_binding(key, binding))
                .add_user(worker_name);
        }
    }

    pub fn get(&self, key: &ResourceKey) -> Option<&ResourceUsage> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of a whole-account scan.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub index: ResourceIndex,
    /// Workers whose bindings were folded into the index.
    pub scanned: Vec<String>,
    /// Workers whose bindings could not be read, or were never fetched
    /// because the scan was cancelled. Sharing through these workers is
    /// invisible to classification.
    pub unscanned: Vec<String>,
    pub cancelled: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    /// Maximum number of binding fetches in flight.
    pub concurrency: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            concurrency: crate::config::defaults::default_scan_concurrency(),
        }
    }
}

/// Progress notification after each completed binding fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanProgress {
    pub current: usize,
    pub total: usize,
    pub worker_name: String,
}
