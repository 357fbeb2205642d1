//! Engine configuration.
//!
//! Loaded from `config.json` (missing fields fall back to defaults), then
//! overridden from the environment. The trust-domain whitelist is frozen
//! into a [`TrustDomains`] set when the engine is built.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrustError};
use crate::identity::TrustDomains;
use crate::policy::PolicyDocument;

/// Comma-separated whitelist override.
pub const TRUST_DOMAINS_ENV: &str = "ATRUST_TRUST_DOMAINS";

pub const DEFAULT_TRUST_DOMAINS: &[&str] = &[
    "gptapp.ai",
    "gptapps.ai",
    "gigacity.xyz",
    "gptarticles.xyz",
    "example.xyz",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Whitelisted trust domains.
    #[serde(default = "default_trust_domains")]
    pub trust_domains: TrustDomains,
    /// Maximum number of edges a reachability search follows.
    #[serde(default = "default_max_graph_depth")]
    pub max_graph_depth: usize,
    /// Credential lifetime. `None` issues credentials that never expire.
    #[serde(default)]
    pub credential_ttl_secs: Option<u64>,
    /// How often a blocked lock waiter re-checks its deadline.
    #[serde(default = "default_lock_poll_interval_ms")]
    pub lock_poll_interval_ms: u64,
    /// Attached to identities issued without an explicit policy set.
    #[serde(default = "PolicyDocument::default_read_only")]
    pub default_policy: PolicyDocument,
}

fn default_trust_domains() -> TrustDomains {
    TrustDomains::new(DEFAULT_TRUST_DOMAINS)
}
fn default_max_graph_depth() -> usize {
    32
}
fn default_lock_poll_interval_ms() -> u64 {
    1
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trust_domains: default_trust_domains(),
            max_graph_depth: default_max_graph_depth(),
            credential_ttl_secs: None,
            lock_poll_interval_ms: default_lock_poll_interval_ms(),
            default_policy: PolicyDocument::default_read_only(),
        }
    }
}

impl EngineConfig {
    /// Load config from a JSON file, falling back to defaults when the file
    /// does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| TrustError::Config(format!("{}: {e}", path.display())))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| TrustError::Serialization(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply `ATRUST_TRUST_DOMAINS` if set.
    pub fn apply_env(self) -> Self {
        self.apply_domains_override(std::env::var(TRUST_DOMAINS_ENV).ok().as_deref())
    }

    fn apply_domains_override(mut self, value: Option<&str>) -> Self {
        if let Some(list) = value {
            self.trust_domains = TrustDomains::parse_list(list);
            log::debug!("trust domains overridden from {TRUST_DOMAINS_ENV}");
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_graph_depth == 0 {
            return Err(TrustError::Config("max_graph_depth must be at least 1".into()));
        }
        if self.lock_poll_interval_ms == 0 {
            return Err(TrustError::Config(
                "lock_poll_interval_ms must be at least 1".into(),
            ));
        }
        if self.credential_ttl_secs == Some(0) {
            return Err(TrustError::Config("credential_ttl_secs must be positive".into()));
        }
        self.default_policy
            .validate()
            .map_err(|e| TrustError::Config(format!("default_policy: {e}")))
    }

    pub fn credential_ttl(&self) -> Option<Duration> {
        self.credential_ttl_secs.map(Duration::from_secs)
    }

    pub fn lock_poll_interval(&self) -> Duration {
        Duration::from_millis(self.lock_poll_interval_ms)
    }
}
