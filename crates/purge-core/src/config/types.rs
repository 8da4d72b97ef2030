//! Configuration types loaded from TOML config files.
//!
//! # Example Configuration
//!
//! ```toml
//! [account]
//! id = "0123456789abcdef0123456789abcdef"
//!
//! [api]
//! base_url = "https://api.cloudflare.com/client/v4"
//! timeout_secs = 30
//!
//! [scan]
//! concurrency = 8
//! skip_dependency_check = false
//! ```
//!
//! Every field is optional so that a later source only overrides what it sets.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::defaults;

/// Main configuration, merged from every source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeConfig {
    #[serde(default)]
    pub account: AccountConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Account to operate on. Discovered from the token when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds.
    /// Default: 30.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Parallel binding fetches during the account scan.
    /// Default: 8.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_dependency_check: Option<bool>,
}

impl ApiConfig {
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(defaults::DEFAULT_API_BASE_URL)
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
            .unwrap_or_else(defaults::default_timeout_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs())
    }
}

impl ScanConfig {
    pub fn concurrency(&self) -> usize {
        self.concurrency
            .unwrap_or_else(defaults::default_scan_concurrency)
    }

    pub fn skip_dependency_check(&self) -> bool {
        self.skip_dependency_check.unwrap_or(false)
    }
}
