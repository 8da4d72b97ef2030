//! Worker and binding types as reported by the remote catalog.
//!
//! [`Binding`] deserializes directly from the provider's settings payload:
//!
//! ```json
//! { "type": "kv_namespace", "name": "CACHE", "namespace_id": "0f2a..." }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A worker as returned by the account listing (no bindings).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerSummary {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_on: Option<DateTime<Utc>>,
}

impl WorkerSummary {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_on: None,
            modified_on: None,
        }
    }
}

/// A worker together with its declared bindings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub name: String,
    pub bindings: Vec<Binding>,
}

impl Worker {
    pub fn new(name: impl Into<String>, bindings: Vec<Binding>) -> Self {
        Self {
            name: name.into(),
            bindings,
        }
    }
}

/// One declared dependency of a worker.
///
/// `name` is the variable the worker sees at runtime. It is local to the
/// owning worker and never identifies the underlying resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub kind: BindingKind,
}

impl Binding {
    pub fn new(name: impl Into<String>, kind: BindingKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BindingKind {
    KvNamespace {
        namespace_id: String,
    },
    R2Bucket {
        bucket_name: String,
    },
    D1 {
        #[serde(rename = "id")]
        database_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        database_name: Option<String>,
    },
    DurableObjectNamespace {
        class_name: String,
        /// Owning script when the class lives in another worker.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        script_name: Option<String>,
    },
    Service {
        service: String,
    },
    Queue {
        queue_name: String,
    },
    PlainText,
    SecretText,
    /// Hyperdrive, vectorize, mTLS certificates and anything newer.
    #[serde(other)]
    Other,
}

impl BindingKind {
    /// Provider type tag, for logs.
    pub fn type_name(&self) -> &'static str {
        match self {
            BindingKind::KvNamespace { .. } => "kv_namespace",
            BindingKind::R2Bucket { .. } => "r2_bucket",
            BindingKind::D1 { .. } => "d1",
            BindingKind::DurableObjectNamespace { .. } => "durable_object_namespace",
            BindingKind::Service { .. } => "service",
            BindingKind::Queue { .. } => "queue",
            BindingKind::PlainText => "plain_text",
            BindingKind::SecretText => "secret_text",
            BindingKind::Other => "other",
        }
    }
}

/// Kinds of independently addressable backing resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    KvNamespace,
    Bucket,
    Database,
    Queue,
}

impl ResourceKind {
    /// Short prefix used in resource keys.
    pub fn prefix(&self) -> &'static str {
        match self {
            ResourceKind::KvNamespace => "kv",
            ResourceKind::Bucket => "r2",
            ResourceKind::Database => "d1",
            ResourceKind::Queue => "queue",
        }
    }

    /// Whether the catalog can resolve a display name for this kind.
    pub fn supports_name_lookup(&self) -> bool {
        matches!(self, ResourceKind::KvNamespace | ResourceKind::Database)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResourceKind::KvNamespace => "KV namespace",
            ResourceKind::Bucket => "R2 bucket",
            ResourceKind::Database => "D1 database",
            ResourceKind::Queue => "queue",
        };
        f.write_str(label)
    }
}
