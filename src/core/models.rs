// src/core/models.rs

use crate::core::knowledge_base::FindingCategory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use strum::{Display, EnumIter};

// --- Shared Types ---

/// Severity of a recommendation, used for ordering inside the UI and colouring.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

/// The analyzers that contribute a partial score.
///
/// The declaration order is the recommendation priority order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ModuleKind {
    Robots,
    Structure,
    Schema,
    Content,
    Eeat,
    Entities,
    Links,
}

/// The uniform view every module result offers to generic code
/// (score aggregation, the UI summary, logging).
pub trait ModuleOutcome {
    fn module(&self) -> ModuleKind;
    /// Partial score in [0, 100].
    fn score_part(&self) -> f64;
    /// Human-readable issues detected by the module.
    fn issues(&self) -> &[String];
}

macro_rules! module_outcome {
    ($ty:ty, $kind:expr) => {
        impl ModuleOutcome for $ty {
            fn module(&self) -> ModuleKind {
                $kind
            }
            fn score_part(&self) -> f64 {
                self.score_part
            }
            fn issues(&self) -> &[String] {
                &self.issues
            }
        }
    };
}

// --- Robots ---

/// Whether one AI crawler may fetch the audited URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BotAccess {
    pub bot: String,
    pub allowed: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RobotsResults {
    pub robots_url: String,
    pub bots: Vec<BotAccess>,
    pub error: Option<String>,
    pub score_part: f64,
    pub issues: Vec<String>,
}

impl RobotsResults {
    pub fn blocked_bots(&self) -> Vec<&str> {
        self.bots
            .iter()
            .filter(|b| !b.allowed)
            .map(|b| b.bot.as_str())
            .collect()
    }
}

module_outcome!(RobotsResults, ModuleKind::Robots);

// --- Structure ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
pub enum Language {
    #[strum(serialize = "en")]
    #[serde(rename = "en")]
    English,
    #[strum(serialize = "pt")]
    #[serde(rename = "pt")]
    Portuguese,
}

/// Qualitative difficulty tier of a Flesch Reading Ease value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
pub enum ReadingLevel {
    #[strum(serialize = "very easy")]
    #[serde(rename = "very easy")]
    VeryEasy,
    #[strum(serialize = "easy/medium")]
    #[serde(rename = "easy/medium")]
    EasyMedium,
    #[strum(serialize = "hard")]
    #[serde(rename = "hard")]
    Hard,
    #[strum(serialize = "very hard")]
    #[serde(rename = "very hard")]
    VeryHard,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Readability {
    pub flesch_reading_ease: f64,
    pub level: ReadingLevel,
    pub language: Language,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructureResults {
    pub h1_count: usize,
    pub hierarchy_score: f64,
    pub question_headers_count: usize,
    pub question_headers: Vec<String>,
    pub answer_capsules_count: usize,
    pub fragment_anchors_count: usize,
    pub readability: Option<Readability>,
    pub score_part: f64,
    pub issues: Vec<String>,
}

module_outcome!(StructureResults, ModuleKind::Structure);

// --- Schema (JSON-LD) ---

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaResults {
    pub blocks_found: usize,
    pub found_types: BTreeSet<String>,
    pub has_faq: bool,
    pub has_article: bool,
    pub has_reviewer: bool,
    pub entity_links_valid: bool,
    pub freshness_valid: bool,
    pub score_part: f64,
    pub issues: Vec<String>,
}

module_outcome!(SchemaResults, ModuleKind::Schema);

// --- Main Content ---

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentResults {
    /// Which container was used: `main`, `article` or `body`.
    pub container: String,
    pub has_semantic_marker: bool,
    pub text_length: usize,
    pub markup_length: usize,
    /// Text-to-markup ratio in percent, rounded to two decimals.
    pub text_ratio: f64,
    pub page_bytes: usize,
    pub oversized: bool,
    pub score_part: f64,
    pub issues: Vec<String>,
}

module_outcome!(ContentResults, ModuleKind::Content);

// --- Entities ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityMethod {
    Recognizer,
    Capitalization,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum EntityLabel {
    Org,
    Person,
    Loc,
    Misc,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entity {
    pub text: String,
    pub label: Option<EntityLabel>,
    pub count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityResults {
    pub method: Option<EntityMethod>,
    pub entities: Vec<Entity>,
    pub topic: Option<String>,
    pub topic_relevant: bool,
    pub score_part: f64,
    pub issues: Vec<String>,
}

module_outcome!(EntityResults, ModuleKind::Entities);

// --- E-E-A-T ---

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EeatResults {
    pub has_author_bio: bool,
    pub citation_count: usize,
    pub stats_density: usize,
    pub score_part: f64,
    pub issues: Vec<String>,
}

module_outcome!(EeatResults, ModuleKind::Eeat);

// --- Links ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AuthorityTier {
    Gov,
    Edu,
    Org,
    Generic,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkCandidate {
    pub url: String,
    pub tier: AuthorityTier,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
pub enum ProbeMethod {
    #[strum(serialize = "HEAD")]
    #[serde(rename = "HEAD")]
    Head,
    #[strum(serialize = "GET")]
    #[serde(rename = "GET")]
    Get,
    #[strum(serialize = "unreachable")]
    #[serde(rename = "unreachable")]
    Unreachable,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkCheckResult {
    #[serde(flatten)]
    pub candidate: LinkCandidate,
    pub broken: bool,
    pub method: ProbeMethod,
    pub status: Option<u16>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TierCounts {
    pub gov: usize,
    pub edu: usize,
    pub org: usize,
    pub generic: usize,
}

impl TierCounts {
    pub fn add(&mut self, tier: AuthorityTier) {
        match tier {
            AuthorityTier::Gov => self.gov += 1,
            AuthorityTier::Edu => self.edu += 1,
            AuthorityTier::Org => self.org += 1,
            AuthorityTier::Generic => self.generic += 1,
        }
    }

    pub fn authoritative(&self) -> usize {
        self.gov + self.edu + self.org
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkResults {
    pub total_external: usize,
    pub tiers: TierCounts,
    pub sampled: usize,
    pub broken_count: usize,
    pub checks: Vec<LinkCheckResult>,
    pub score_part: f64,
    pub issues: Vec<String>,
}

impl LinkResults {
    pub fn broken_links(&self) -> impl Iterator<Item = &LinkCheckResult> {
        self.checks.iter().filter(|c| c.broken)
    }
}

module_outcome!(LinkResults, ModuleKind::Links);

// --- Authority (external search index) ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthoritySnapshot {
    pub indexed_pages: u64,
    pub sample_results: usize,
    /// Which response field produced `indexed_pages`.
    pub source: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuthorityStatus {
    #[default]
    Disabled,
    Available(AuthoritySnapshot),
    Error { message: String },
}

// --- Main Report ---

/// The per-module results of one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleResults {
    pub robots: RobotsResults,
    pub structure: StructureResults,
    pub schema: SchemaResults,
    pub content: ContentResults,
    pub eeat: EeatResults,
    pub entities: EntityResults,
    pub links: LinkResults,
}

impl ModuleResults {
    /// Every module result in priority order.
    pub fn outcomes(&self) -> [&dyn ModuleOutcome; 7] {
        [
            &self.robots,
            &self.structure,
            &self.schema,
            &self.content,
            &self.eeat,
            &self.entities,
            &self.links,
        ]
    }

    pub fn scores(&self) -> BTreeMap<ModuleKind, f64> {
        self.outcomes()
            .iter()
            .map(|o| (o.module(), o.score_part()))
            .collect()
    }
}

/// One prioritized action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recommendation {
    /// Knowledge-base code, e.g. `ROBOTS_BOTS_BLOCKED`.
    pub code: String,
    pub category: FindingCategory,
    pub severity: Severity,
    pub message: String,
}

/// The root aggregate handed to the UI, the JSON output or the export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub url: String,
    pub timestamp: DateTime<Utc>,
    pub geo_score: f64,
    pub score_policy: String,
    pub topic: Option<String>,
    pub modules: ModuleResults,
    pub recommendations: Vec<Recommendation>,
    pub authority: AuthorityStatus,
    pub qualitative_summary: Option<String>,
}

impl AuditReport {
    /// Condensed view sent to the qualitative-summary generator.
    pub fn digest(&self) -> serde_json::Value {
        serde_json::json!({
            "url": self.url,
            "geo_score": self.geo_score,
            "topic": self.topic,
            "scores": self.modules.scores(),
            "recommendations": self
                .recommendations
                .iter()
                .take(8)
                .map(|r| r.message.as_str())
                .collect::<Vec<_>>(),
        })
    }
}
