//! Generative Engine Optimization audit for a single web page.
//!
//! The [`core`] module holds the audit pipeline: one fetched document, a set of
//! independent analyzers, a weighted composite score and a ranked list of
//! recommendations. The binary adds the terminal UI and headless output on top.

pub mod core;
pub mod logging;

pub use crate::core::config::AuditConfig;
pub use crate::core::error::AuditError;
pub use crate::core::models::AuditReport;
pub use crate::core::scanner::AuditPipeline;
