// src/core/providers/mod.rs

// Collaborators that live outside the page being audited. They are blocking
// by contract; the pipeline dispatches them with `spawn_blocking`.

pub mod authority;
pub mod summary;

use crate::core::config::AuditConfig;
use crate::core::models::AuthoritySnapshot;
use crate::core::scanner::entity_scanner::{default_strategies, EntityStrategy};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

pub use self::authority::GoogleSearchAuthority;
pub use self::summary::OpenAiSummary;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response: {0}")]
    Response(String),
}

/// Counts how many pages of a host the search index knows about.
pub trait AuthorityProvider: Send + Sync {
    fn lookup(&self, host: &str) -> Result<AuthoritySnapshot, ProviderError>;
}

/// Writes a short qualitative assessment from the report digest.
pub trait SummaryProvider: Send + Sync {
    fn summarize(&self, digest: &serde_json::Value) -> Result<String, ProviderError>;
}

/// The optional capabilities an audit runs with, fixed at construction.
pub struct Capabilities {
    pub entity_strategies: Vec<Box<dyn EntityStrategy>>,
    pub authority: Option<Arc<dyn AuthorityProvider>>,
    pub summary: Option<Arc<dyn SummaryProvider>>,
}

impl Capabilities {
    /// Enables each provider whose credentials are configured.
    pub fn from_config(config: &AuditConfig) -> Self {
        let authority = GoogleSearchAuthority::from_config(&config.search)
            .map(|p| Arc::new(p) as Arc<dyn AuthorityProvider>);
        let summary =
            OpenAiSummary::from_config(&config.summary).map(|p| Arc::new(p) as Arc<dyn SummaryProvider>);
        info!(
            authority = authority.is_some(),
            summary = summary.is_some(),
            recognizer = config.use_entity_recognizer,
            "Capabilities resolved."
        );
        Self {
            entity_strategies: default_strategies(config.use_entity_recognizer),
            authority,
            summary,
        }
    }

    /// Default entity chain and no external providers.
    pub fn offline() -> Self {
        Self {
            entity_strategies: default_strategies(true),
            authority: None,
            summary: None,
        }
    }
}
