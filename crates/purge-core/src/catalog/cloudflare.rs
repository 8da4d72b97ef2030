//! Cloudflare v4 API implementation of [`WorkerCatalog`].
//!
//! All calls are blocking so the catalog can be shared across the scan
//! thread pool without an async runtime.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::{Method, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::catalog::errors::CatalogError;
use crate::catalog::traits::WorkerCatalog;
use crate::catalog::types::{Binding, ResourceKind, WorkerSummary};

pub const DEFAULT_API_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

/// Environment variable holding the API token.
pub const API_TOKEN_ENV: &str = "CLOUDFLARE_API_TOKEN";

/// Read the API token from the environment.
pub fn api_token_from_env() -> Result<String, CatalogError> {
    match std::env::var(API_TOKEN_ENV) {
        Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(CatalogError::MissingCredentials {
            variable: API_TOKEN_ENV,
        }),
    }
}

/// Standard response envelope: `{ success, errors, result }`.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    #[serde(default)]
    result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ScriptListing {
    id: String,
    #[serde(default)]
    created_on: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    modified_on: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Deserialize)]
struct ScriptSettings {
    #[serde(default)]
    bindings: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct KvNamespaceInfo {
    title: String,
}

#[derive(Debug, Deserialize)]
struct DatabaseInfo {
    name: String,
}

#[derive(Debug, Deserialize)]
struct AccountInfo {
    id: String,
}

pub struct CloudflareCatalog {
    client: Client,
    base_url: Url,
    account_id: String,
    api_token: String,
}

impl CloudflareCatalog {
    /// Build a catalog for a known account.
    pub fn new(
        base_url: &str,
        account_id: &str,
        api_token: &str,
        timeout: Duration,
    ) -> Result<Self, CatalogError> {
        let base_url = parse_base_url(base_url)?;
        let client = build_client(timeout)?;

        Ok(Self {
            client,
            base_url,
            account_id: account_id.to_string(),
            api_token: api_token.to_string(),
        })
    }

    /// Build a catalog, discovering the account when none is given.
    ///
    /// Discovery succeeds only when the token grants access to exactly one account.
    pub fn connect(
        base_url: &str,
        account_id: Option<&str>,
        api_token: &str,
        timeout: Duration,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::new(base_url, account_id.unwrap_or_default(), api_token, timeout)?;

        if catalog.account_id.is_empty() {
            catalog.account_id = catalog.discover_account_id()?;
        }

        info!(
            event = "core.catalog.connected",
            account_id = catalog.account_id,
            base_url = %catalog.base_url
        );

        Ok(catalog)
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    fn discover_account_id(&self) -> Result<String, CatalogError> {
        info!(event = "core.catalog.account_discovery_started");

        let accounts: Vec<AccountInfo> =
            self.get(&["accounts"], || CatalogError::NoAccounts)?;

        match accounts.as_slice() {
            [] => Err(CatalogError::NoAccounts),
            [account] => {
                info!(
                    event = "core.catalog.account_discovery_completed",
                    account_id = account.id
                );
                Ok(account.id.clone())
            }
            many => Err(CatalogError::AmbiguousAccount { count: many.len() }),
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, CatalogError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CatalogError::InvalidEndpoint {
                url: self.base_url.to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn account_endpoint(&self, segments: &[&str]) -> Result<Url, CatalogError> {
        let mut full = vec!["accounts", self.account_id.as_str()];
        full.extend_from_slice(segments);
        self.endpoint(&full)
    }

    /// Send a request and unwrap the envelope, returning its `result`.
    fn send(
        &self,
        method: Method,
        url: Url,
        not_found: impl FnOnce() -> CatalogError,
    ) -> Result<serde_json::Value, CatalogError> {
        debug!(event = "core.catalog.request_started", method = %method, url = %url);

        let response = self
            .client
            .request(method.clone(), url.clone())
            .bearer_auth(&self.api_token)
            .send()
            .map_err(|e| CatalogError::TransientNetwork {
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| CatalogError::TransientNetwork {
                message: e.to_string(),
            })?;

        let envelope = serde_json::from_str::<Envelope>(&body).ok();
        let message = envelope
            .as_ref()
            .map(|e| envelope_message(&e.errors))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());

        if !status.is_success() {
            debug!(
                event = "core.catalog.request_failed",
                method = %method,
                url = %url,
                status = status.as_u16(),
                message = message
            );
            return Err(classify_failure(status, message, not_found));
        }

        match envelope {
            Some(envelope) if envelope.success => Ok(envelope.result),
            Some(_) => Err(CatalogError::RemoteError {
                status: status.as_u16(),
                message,
            }),
            None => Err(CatalogError::InvalidResponse {
                message: format!("unparseable response body from {}", url),
            }),
        }
    }

    fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        not_found: impl FnOnce() -> CatalogError,
    ) -> Result<T, CatalogError> {
        let url = self.endpoint(segments)?;
        let result = self.send(Method::GET, url, not_found)?;
        serde_json::from_value(result).map_err(|e| CatalogError::InvalidResponse {
            message: e.to_string(),
        })
    }

    fn get_in_account<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        not_found: impl FnOnce() -> CatalogError,
    ) -> Result<T, CatalogError> {
        let url = self.account_endpoint(segments)?;
        let result = self.send(Method::GET, url, not_found)?;
        serde_json::from_value(result).map_err(|e| CatalogError::InvalidResponse {
            message: e.to_string(),
        })
    }

    fn delete_in_account(&self, segments: &[&str], resource: &str) -> Result<(), CatalogError> {
        let url = self.account_endpoint(segments)?;
        self.send(Method::DELETE, url, || CatalogError::NotFound {
            resource: resource.to_string(),
        })?;
        Ok(())
    }
}

impl WorkerCatalog for CloudflareCatalog {
    fn list_workers(&self) -> Result<Vec<WorkerSummary>, CatalogError> {
        let scripts: Vec<ScriptListing> =
            self.get_in_account(&["workers", "scripts"], || CatalogError::AccountNotFound {
                account_id: self.account_id.clone(),
            })?;

        Ok(scripts
            .into_iter()
            .map(|script| WorkerSummary {
                name: script.id,
                created_on: script.created_on,
                modified_on: script.modified_on,
            })
            .collect())
    }

    fn get_worker_bindings(&self, worker_name: &str) -> Result<Vec<Binding>, CatalogError> {
        let settings: ScriptSettings = self.get_in_account(
            &["workers", "scripts", worker_name, "settings"],
            || CatalogError::WorkerNotFound {
                name: worker_name.to_string(),
            },
        )?;

        Ok(parse_bindings(worker_name, settings.bindings))
    }

    fn delete_worker(&self, worker_name: &str) -> Result<(), CatalogError> {
        let url = self.account_endpoint(&["workers", "scripts", worker_name])?;
        self.send(Method::DELETE, url, || CatalogError::WorkerNotFound {
            name: worker_name.to_string(),
        })?;
        Ok(())
    }

    fn delete_kv_namespace(&self, namespace_id: &str) -> Result<(), CatalogError> {
        self.delete_in_account(&["storage", "kv", "namespaces", namespace_id], namespace_id)
    }

    fn delete_bucket(&self, bucket_name: &str) -> Result<(), CatalogError> {
        self.delete_in_account(&["r2", "buckets", bucket_name], bucket_name)
    }

    fn delete_database(&self, database_id: &str) -> Result<(), CatalogError> {
        self.delete_in_account(&["d1", "database", database_id], database_id)
    }

    fn lookup_display_name(
        &self,
        kind: ResourceKind,
        id: &str,
    ) -> Result<Option<String>, CatalogError> {
        let not_found = || CatalogError::NotFound {
            resource: id.to_string(),
        };

        match kind {
            ResourceKind::KvNamespace => {
                let info: KvNamespaceInfo =
                    self.get_in_account(&["storage", "kv", "namespaces", id], not_found)?;
                Ok(Some(info.title))
            }
            ResourceKind::Database => {
                let info: DatabaseInfo = self.get_in_account(&["d1", "database", id], not_found)?;
                Ok(Some(info.name))
            }
            ResourceKind::Bucket | ResourceKind::Queue => Ok(None),
        }
    }
}

fn build_client(timeout: Duration) -> Result<Client, CatalogError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("purge/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| CatalogError::TransientNetwork {
            message: format!("failed to build HTTP client: {}", e),
        })
}

fn parse_base_url(base_url: &str) -> Result<Url, CatalogError> {
    let url = Url::parse(base_url).map_err(|_| CatalogError::InvalidEndpoint {
        url: base_url.to_string(),
    })?;

    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(CatalogError::InvalidEndpoint {
            url: base_url.to_string(),
        });
    }

    Ok(url)
}

fn envelope_message(errors: &[ApiMessage]) -> String {
    errors
        .iter()
        .map(|e| {
            if e.code == 0 {
                e.message.clone()
            } else {
                format!("{} (code {})", e.message, e.code)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Map a non-success HTTP status to a catalog error.
///
/// 404 is operation-specific, so the caller supplies it.
fn classify_failure(
    status: StatusCode,
    message: String,
    not_found: impl FnOnce() -> CatalogError,
) -> CatalogError {
    match status {
        StatusCode::NOT_FOUND => not_found(),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CatalogError::NotAuthorized { message },
        StatusCode::TOO_MANY_REQUESTS => CatalogError::TransientNetwork { message },
        s if s.is_server_error() => CatalogError::TransientNetwork { message },
        s => CatalogError::RemoteError {
            status: s.as_u16(),
            message,
        },
    }
}

/// Parse bindings one at a time so a single malformed entry does not hide the rest.
fn parse_bindings(worker_name: &str, raw: Vec<serde_json::Value>) -> Vec<Binding> {
    raw.into_iter()
        .filter_map(|value| match serde_json::from_value::<Binding>(value) {
            Ok(binding) => {
                debug!(
                    event = "core.catalog.binding_parsed",
                    worker = worker_name,
                    binding = binding.name,
                    binding_type = binding.kind.type_name()
                );
                Some(binding)
            }
            Err(e) => {
                warn!(
                    event = "core.catalog.binding_parse_failed",
                    worker = worker_name,
                    error = %e
                );
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::BindingKind;

    fn catalog() -> CloudflareCatalog {
        CloudflareCatalog::new(
            DEFAULT_API_BASE_URL,
            "acct-123",
            "token",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_account_endpoint_appends_segments() {
        let url = catalog()
            .account_endpoint(&["workers", "scripts", "billing-svc", "settings"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.cloudflare.com/client/v4/accounts/acct-123/workers/scripts/billing-svc/settings"
        );
    }

    #[test]
    fn test_endpoint_handles_trailing_slash_and_escapes() {
        let catalog = CloudflareCatalog::new(
            "http://localhost:8787/client/v4/",
            "acct",
            "token",
            Duration::from_secs(5),
        )
        .unwrap();
        let url = catalog.endpoint(&["r2", "buckets", "a b"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8787/client/v4/r2/buckets/a%20b");
    }

    #[test]
    fn test_parse_base_url_rejects_non_http() {
        assert!(matches!(
            parse_base_url("ftp://example.com"),
            Err(CatalogError::InvalidEndpoint { .. })
        ));
        assert!(matches!(
            parse_base_url("not a url"),
            Err(CatalogError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn test_classify_failure_status_mapping() {
        let nf = || CatalogError::NotFound {
            resource: "ns-1".to_string(),
        };
        assert!(matches!(
            classify_failure(StatusCode::NOT_FOUND, "gone".into(), nf),
            CatalogError::NotFound { .. }
        ));
        assert!(matches!(
            classify_failure(StatusCode::FORBIDDEN, "no".into(), nf),
            CatalogError::NotAuthorized { .. }
        ));
        assert!(matches!(
            classify_failure(StatusCode::UNAUTHORIZED, "no".into(), nf),
            CatalogError::NotAuthorized { .. }
        ));
        assert!(matches!(
            classify_failure(StatusCode::TOO_MANY_REQUESTS, "slow down".into(), nf),
            CatalogError::TransientNetwork { .. }
        ));
        assert!(matches!(
            classify_failure(StatusCode::BAD_GATEWAY, "upstream".into(), nf),
            CatalogError::TransientNetwork { .. }
        ));
        assert!(matches!(
            classify_failure(StatusCode::CONFLICT, "in use".into(), nf),
            CatalogError::RemoteError { status: 409, .. }
        ));
    }

    #[test]
    fn test_envelope_message_joins_errors() {
        let errors = vec![
            ApiMessage {
                code: 10007,
                message: "workers.api.error.script_not_found".to_string(),
            },
            ApiMessage {
                code: 0,
                message: "second".to_string(),
            },
        ];
        assert_eq!(
            envelope_message(&errors),
            "workers.api.error.script_not_found (code 10007); second"
        );
    }

    #[test]
    fn test_parse_bindings_skips_malformed_entries() {
        let raw: Vec<serde_json::Value> = serde_json::from_str(
            r#"[
                {"type": "kv_namespace", "name": "CACHE", "namespace_id": "ns-1"},
                {"name": "NO_TYPE"},
                {"type": "r2_bucket", "name": "ASSETS"},
                {"type": "queue", "name": "JOBS", "queue_name": "jobs"}
            ]"#,
        )
        .unwrap();

        let bindings = parse_bindings("billing-svc", raw);
        assert_eq!(bindings.len(), 2);
        assert!(matches!(bindings[0].kind, BindingKind::KvNamespace { .. }));
        assert!(matches!(bindings[1].kind, BindingKind::Queue { .. }));
    }

    #[test]
    fn test_settings_envelope_deserializes() {
        let body = r#"{
            "success": true,
            "errors": [],
            "messages": [],
            "result": {
                "bindings": [{"type": "d1", "name": "DB", "id": "db-7"}],
                "compatibility_date": "2024-01-01"
            }
        }"#;
        let envelope: Envelope = serde_json::from_str(body).unwrap();
        assert!(envelope.success);
        let settings: ScriptSettings = serde_json::from_value(envelope.result).unwrap();
        assert_eq!(settings.bindings.len(), 1);
    }

    #[test]
    fn test_script_listing_deserializes_timestamps() {
        let raw = r#"[{"id": "billing-svc", "created_on": "2024-03-01T10:00:00.000000Z", "modified_on": "2024-04-01T10:00:00Z"}]"#;
        let scripts: Vec<ScriptListing> = serde_json::from_str(raw).unwrap();
        assert_eq!(scripts[0].id, "billing-svc");
        assert!(scripts[0].created_on.is_some());
    }
}
