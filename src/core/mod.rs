// src/core/mod.rs

// The root of the audit pipeline. Everything the terminal UI and the headless
// mode need is reachable from here; none of it depends on the UI.

/// Result records for every analyzer plus the final `AuditReport`.
pub mod models;

/// Typed errors for the fatal paths of an audit (invalid URL, page fetch).
pub mod error;

/// Runtime configuration loaded from the config directory and the environment.
pub mod config;

/// Page retrieval with timeout and a single retry.
pub mod fetcher;

/// The immutable parsed snapshot every document analyzer reads.
pub mod document;

/// Language-aware Flesch Reading Ease.
pub mod readability;

/// The analyzers themselves and the orchestrating `AuditPipeline`.
pub mod scanner;

/// Optional external collaborators: search-index authority and LLM summary.
pub mod providers;

/// Versioned weight/threshold tables and the composite score.
pub mod score;

/// Static catalogue of every finding the recommendation engine can emit,
/// with human-readable explanations and remediation steps.
pub mod knowledge_base;

/// Derives the prioritized, deduplicated action list from module results.
pub mod recommendations;
