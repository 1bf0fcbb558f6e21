// src/core/scanner/mod.rs

// The analyzers and the pipeline that runs them against one page.
pub mod content_scanner;
pub mod eeat_scanner;
pub mod entity_scanner;
pub mod link_scanner;
pub mod robots_scanner;
pub mod schema_scanner;
pub mod structure_scanner;

use crate::core::config::AuditConfig;
use crate::core::document::Document;
use crate::core::error::AuditError;
use crate::core::fetcher::{normalize_target, HttpFetcher};
use crate::core::models::{AuditReport, AuthorityStatus, ModuleResults};
use crate::core::providers::Capabilities;
use crate::core::recommendations::generate_recommendations;
use crate::core::score::{composite_score, ScorePolicy};
use chrono::Utc;
use tokio::task::spawn_blocking;
use tracing::{debug, error, info, warn};

use self::content_scanner::run_content_scan;
use self::eeat_scanner::run_eeat_scan;
use self::entity_scanner::run_entity_scan;
use self::link_scanner::{collect_external_links, run_link_audit};
use self::robots_scanner::run_robots_scan;
use self::schema_scanner::run_schema_scan;
use self::structure_scanner::run_structure_scan;

/// Runs every analyzer against one page and assembles the report.
///
/// The score policy, HTTP client and optional capabilities are fixed when the
/// pipeline is built; `run` can be called any number of times.
pub struct AuditPipeline {
    config: AuditConfig,
    policy: ScorePolicy,
    fetcher: HttpFetcher,
    capabilities: Capabilities,
}

impl AuditPipeline {
    /// Builds a pipeline whose providers are enabled from `config` credentials.
    pub fn new(config: AuditConfig) -> Result<Self, AuditError> {
        let capabilities = Capabilities::from_config(&config);
        Self::with_capabilities(config, capabilities)
    }

    pub fn with_capabilities(config: AuditConfig, capabilities: Capabilities) -> Result<Self, AuditError> {
        let policy = ScorePolicy::from_config(&config)?;
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self {
            config,
            policy,
            fetcher,
            capabilities,
        })
    }

    /// Audits `target`. Only an invalid URL or a failed page fetch is fatal.
    pub async fn run(&self, target: &str) -> Result<AuditReport, AuditError> {
        let url = normalize_target(target)?;
        info!(url = %url, policy = %self.policy.version, "Starting audit.");
        let page = self.fetcher.fetch(&url).await?;

        // The parsed tree is not Send: every document analyzer runs here and
        // the tree is dropped before the next await.
        let (structure, schema, content, entities, eeat, candidates, topic) = {
            let doc = Document::parse(&page);
            (
                run_structure_scan(&doc),
                run_schema_scan(&doc, &self.policy, Utc::now()),
                run_content_scan(&doc, &self.policy),
                run_entity_scan(&doc, &self.capabilities.entity_strategies),
                run_eeat_scan(&doc),
                collect_external_links(&doc),
                doc.topic(),
            )
        };

        let client = self.fetcher.client();
        let (robots, links) = tokio::join!(
            run_robots_scan(client, &page.url, self.config.robots_timeout()),
            run_link_audit(client, candidates, &self.policy, self.config.probe_timeout()),
        );

        let modules = ModuleResults {
            robots,
            structure,
            schema,
            content,
            eeat,
            entities,
            links,
        };
        let geo_score = composite_score(&modules, &self.policy);
        let recommendations = generate_recommendations(&modules, &self.policy);
        info!(geo_score, recommendations = recommendations.len(), "Audit scored.");

        let mut report = AuditReport {
            url: page.url.to_string(),
            timestamp: page.fetched_at,
            geo_score,
            score_policy: self.policy.version.clone(),
            topic,
            modules,
            recommendations,
            authority: AuthorityStatus::Disabled,
            qualitative_summary: None,
        };

        let host = page.url.host_str().unwrap_or_default().to_string();
        let digest = report.digest();
        let (authority, summary) = tokio::join!(self.lookup_authority(host), self.summarize(digest));
        report.authority = authority;
        report.qualitative_summary = summary;

        info!(url = %report.url, geo_score = report.geo_score, "Audit finished.");
        Ok(report)
    }

    async fn lookup_authority(&self, host: String) -> AuthorityStatus {
        let Some(provider) = self.capabilities.authority.clone() else {
            debug!("Authority lookup disabled.");
            return AuthorityStatus::Disabled;
        };
        match spawn_blocking(move || provider.lookup(&host)).await {
            Ok(Ok(snapshot)) => AuthorityStatus::Available(snapshot),
            Ok(Err(e)) => {
                warn!(error = %e, "Authority lookup failed.");
                AuthorityStatus::Error { message: e.to_string() }
            }
            Err(e) => {
                error!(panic = %e, "Authority lookup task panicked!");
                AuthorityStatus::Error {
                    message: format!("Task panicked: {}", e),
                }
            }
        }
    }

    async fn summarize(&self, digest: serde_json::Value) -> Option<String> {
        let provider = self.capabilities.summary.clone()?;
        let text = match spawn_blocking(move || provider.summarize(&digest)).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                warn!(error = %e, "Summary generation failed.");
                format!("Summary unavailable: {}", e)
            }
            Err(e) => {
                error!(panic = %e, "Summary task panicked!");
                format!("Summary unavailable: task panicked: {}", e)
            }
        };
        Some(text)
    }
}
