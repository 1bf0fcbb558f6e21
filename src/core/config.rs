// src/core/config.rs

use crate::core::error::ConfigError;
use crate::core::fetcher::USER_AGENT;
use crate::core::score::Weights;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub const ENV_SEARCH_API_KEY: &str = "GEO_AUDIT_SEARCH_API_KEY";
pub const ENV_SEARCH_ENGINE_ID: &str = "GEO_AUDIT_SEARCH_ENGINE_ID";
pub const ENV_SUMMARY_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_SUMMARY_MODEL: &str = "GEO_AUDIT_SUMMARY_MODEL";
pub const ENV_SCORE_POLICY: &str = "GEO_AUDIT_SCORE_POLICY";

const CONFIG_FILE: &str = "config.json";

/// Credentials and endpoint for the search-index authority lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub api_key: Option<String>,
    pub engine_id: Option<String>,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            engine_id: None,
            endpoint: "https://www.googleapis.com/customsearch/v1".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Credentials and model for the qualitative-summary generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Everything an audit run can be tuned with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub user_agent: String,
    pub page_timeout_secs: u64,
    pub robots_timeout_secs: u64,
    pub probe_timeout_secs: u64,
    /// Name of the weight table (`v1`, `v2`).
    pub score_policy: String,
    /// Replaces the weights of the named policy when present.
    pub weights: Option<Weights>,
    /// Disables the recognizer strategy so entities always come from the
    /// capitalization heuristic.
    pub use_entity_recognizer: bool,
    pub search: SearchConfig,
    pub summary: SummaryConfig,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT.to_string(),
            page_timeout_secs: 10,
            robots_timeout_secs: 5,
            probe_timeout_secs: 5,
            score_policy: "v2".to_string(),
            weights: None,
            use_entity_recognizer: true,
            search: SearchConfig::default(),
            summary: SummaryConfig::default(),
        }
    }
}

impl AuditConfig {
    /// Loads the configuration.
    ///
    /// An explicit `path` must exist. Without one, `config.json` in the
    /// platform config directory is used when present, defaults otherwise.
    /// Environment variables are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(p) => Self::from_file(&p)?,
                None => {
                    debug!("No config file found, using defaults.");
                    Self::default()
                }
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let shown = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: shown.clone(),
            source,
        })?;
        let config = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: shown.clone(),
            source,
        })?;
        info!(path = %shown, "Loaded configuration file.");
        Ok(config)
    }

    /// Overrides fields from environment-style lookups. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = get(ENV_SEARCH_API_KEY) {
            self.search.api_key = Some(v);
        }
        if let Some(v) = get(ENV_SEARCH_ENGINE_ID) {
            self.search.engine_id = Some(v);
        }
        if let Some(v) = get(ENV_SUMMARY_API_KEY) {
            self.summary.api_key = Some(v);
        }
        if let Some(v) = get(ENV_SUMMARY_MODEL) {
            self.summary.model = v;
        }
        if let Some(v) = get(ENV_SCORE_POLICY) {
            self.score_policy = v;
        }
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    pub fn robots_timeout(&self) -> Duration {
        Duration::from_secs(self.robots_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    crate::logging::project_directory().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}
