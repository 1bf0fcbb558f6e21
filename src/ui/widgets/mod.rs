// src/ui/widgets/mod.rs

pub mod analysis_view; // Recommendations list and knowledge-base details.
pub mod footer; // Key hints for the current state.
pub mod input; // Target URL field.
pub mod log_view; // Tail of the log file.
pub mod summary; // GEO score gauge and per-module checks.
