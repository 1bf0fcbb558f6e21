// src/app.rs

use geo_audit::core::models::{AuditReport, Severity};
use geo_audit::logging::{get_data_dir, tail_log};
use ratatui::widgets::{ListState, ScrollbarState};
use std::path::PathBuf;
use tracing::{error, info};

pub const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

const LOG_LINES: usize = 200;

pub enum ExportStatus {
    Idle,
    Success(String),
    Error(String),
}

pub enum AppState {
    Idle,
    Scanning,
    Finished,
    Failed(String),
}

#[derive(Debug, Default)]
pub struct AuditSummary {
    pub score: u8,
    pub critical_issues: usize,
    pub warning_issues: usize,
    pub info_issues: usize,
}

pub struct App {
    pub should_quit: bool,
    pub state: AppState,
    pub input: String,
    pub report: Option<AuditReport>,
    pub summary: AuditSummary,
    /// Gauge value, animated towards `summary.score`.
    pub displayed_score: u8,
    pub spinner_frame: usize,
    pub analysis_list_state: ListState,
    pub show_logs: bool,
    pub log_content: Vec<String>,
    pub log_horizontal_scroll: usize,
    pub log_horizontal_scroll_state: ScrollbarState,
    pub export_status: ExportStatus,
}

impl App {
    pub fn new() -> Self {
        Self {
            should_quit: false,
            state: AppState::Idle,
            input: String::new(),
            report: None,
            summary: AuditSummary::default(),
            displayed_score: 0,
            spinner_frame: 0,
            analysis_list_state: ListState::default(),
            show_logs: false,
            log_content: Vec::new(),
            log_horizontal_scroll: 0,
            log_horizontal_scroll_state: ScrollbarState::default(),
            export_status: ExportStatus::Idle,
        }
    }

    /// Stores a finished audit, or the fatal error that ended it.
    pub fn finish(&mut self, outcome: Result<AuditReport, String>) {
        match outcome {
            Ok(report) => {
                self.summary = summarize(&report);
                self.displayed_score = 0;
                let first = (!report.recommendations.is_empty()).then_some(0);
                self.analysis_list_state.select(first);
                self.report = Some(report);
                self.state = AppState::Finished;
            }
            Err(message) => {
                self.state = AppState::Failed(message);
            }
        }
    }

    pub fn on_tick(&mut self) {
        if matches!(self.state, AppState::Scanning) {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_CHARS.len();
        }
        if self.displayed_score < self.summary.score {
            self.displayed_score = (self.displayed_score + 2).min(self.summary.score);
        }
        if self.show_logs {
            self.log_content = tail_log(LOG_LINES);
        }
    }

    fn recommendation_count(&self) -> usize {
        self.report.as_ref().map_or(0, |r| r.recommendations.len())
    }

    pub fn select_next(&mut self) {
        let count = self.recommendation_count();
        if count == 0 {
            return;
        }
        let next = match self.analysis_list_state.selected() {
            Some(i) if i + 1 < count => i + 1,
            Some(_) => 0,
            None => 0,
        };
        self.analysis_list_state.select(Some(next));
    }

    pub fn select_previous(&mut self) {
        let count = self.recommendation_count();
        if count == 0 {
            return;
        }
        let previous = match self.analysis_list_state.selected() {
            Some(0) | None => count - 1,
            Some(i) => i - 1,
        };
        self.analysis_list_state.select(Some(previous));
    }

    pub fn toggle_logs(&mut self) {
        self.show_logs = !self.show_logs;
        if self.show_logs {
            self.log_content = tail_log(LOG_LINES);
        }
    }

    pub fn scroll_logs_left(&mut self) {
        self.log_horizontal_scroll = self.log_horizontal_scroll.saturating_sub(4);
        self.log_horizontal_scroll_state = self.log_horizontal_scroll_state.position(self.log_horizontal_scroll);
    }

    pub fn scroll_logs_right(&mut self) {
        self.log_horizontal_scroll = self.log_horizontal_scroll.saturating_add(4);
        self.log_horizontal_scroll_state = self.log_horizontal_scroll_state.position(self.log_horizontal_scroll);
    }

    /// Writes the current report as pretty JSON into the data directory.
    pub fn export_report(&mut self) {
        let Some(report) = &self.report else {
            return;
        };
        self.export_status = match write_report(report, get_data_dir()) {
            Ok(path) => {
                info!(path = %path.display(), "Report exported.");
                ExportStatus::Success(path.display().to_string())
            }
            Err(e) => {
                error!(error = %e, "Report export failed.");
                ExportStatus::Error(e.to_string())
            }
        };
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn reset(&mut self) {
        self.state = AppState::Idle;
        self.input = String::new();
        self.report = None;
        self.summary = AuditSummary::default();
        self.displayed_score = 0;
        self.spinner_frame = 0;
        self.analysis_list_state = ListState::default();
        self.export_status = ExportStatus::Idle;
    }
}

fn summarize(report: &AuditReport) -> AuditSummary {
    let count = |severity: Severity| {
        report
            .recommendations
            .iter()
            .filter(|r| r.severity == severity)
            .count()
    };
    AuditSummary {
        score: report.geo_score.round().clamp(0.0, 100.0) as u8,
        critical_issues: count(Severity::Critical),
        warning_issues: count(Severity::Warning),
        info_issues: count(Severity::Info),
    }
}

fn write_report(report: &AuditReport, dir: PathBuf) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(&dir)?;
    let host = url::Url::parse(&report.url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "report".to_string());
    let path = dir.join(format!(
        "geo-audit-{}-{}.json",
        host,
        report.timestamp.format("%Y%m%dT%H%M%S")
    ));
    let json = serde_json::to_string_pretty(report).map_err(std::io::Error::other)?;
    std::fs::write(&path, json)?;
    Ok(path)
}
