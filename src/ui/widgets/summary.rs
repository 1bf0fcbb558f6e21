// src/ui/widgets/summary.rs

use crate::app::{App, AppState};
use geo_audit::core::models::{AuthorityStatus, ModuleOutcome};
use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, Gauge, Paragraph},
};

/// Module scores at or above this value are shown as passed.
const PASS_MARK: f64 = 70.0;

/// Renders the score gauge, the per-module checks, the issue counts and the
/// search-index authority once an audit has finished.
pub fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let summary_container = Block::default().borders(Borders::ALL).title("Summary");
    frame.render_widget(summary_container, area);

    let summary_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Score & rating
            Constraint::Length(1), // Gauge
            Constraint::Length(1),
            Constraint::Length(8), // Module checks
            Constraint::Length(1),
            Constraint::Length(4), // Issue counts
            Constraint::Min(0),    // Authority
        ])
        .split(area);

    let Some(report) = app.report.as_ref().filter(|_| matches!(app.state, AppState::Finished)) else {
        return;
    };

    let (rating_text, rating_style) = match app.summary.score {
        85..=100 => ("Excellent", Style::default().fg(Color::Green)),
        70..=84 => ("Good", Style::default().fg(Color::Cyan)),
        50..=69 => ("Needs Improvement", Style::default().fg(Color::Yellow)),
        _ => ("Poor", Style::default().fg(Color::Red)),
    };
    let score_line = Line::from(format!("{:.1}/100 ({})", report.geo_score, rating_text)).style(rating_style);
    let score_text = Text::from(vec![Line::from("GEO Score".bold()), score_line]);
    frame.render_widget(Paragraph::new(score_text).alignment(Alignment::Center), summary_chunks[0]);

    let score_gauge = Gauge::default()
        .percent(app.displayed_score as u16)
        .label("")
        .style(Style::default().fg(if app.displayed_score >= 70 {
            Color::Green
        } else if app.displayed_score >= 50 {
            Color::Yellow
        } else {
            Color::Red
        }));
    frame.render_widget(score_gauge, summary_chunks[1]);

    let checks_block = Block::default().title(Span::styled(
        format!("MODULES (policy {})", report.score_policy),
        Style::new().bold(),
    ));
    let checks_lines: Vec<Line> = report
        .modules
        .outcomes()
        .iter()
        .map(|outcome| {
            let part = outcome.score_part();
            let (icon, style) = if part >= PASS_MARK {
                ("✓", Style::default().fg(Color::Green))
            } else {
                ("✗", Style::default().fg(Color::Red))
            };
            Line::from(vec![
                Span::styled(format!("{} ", icon), style),
                Span::raw(format!("{:<10} {:>5.1}", outcome.module().to_string(), part)),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(checks_lines).block(checks_block), summary_chunks[3]);

    let issues_block = Block::default().title("RECOMMENDATIONS".bold());
    let details_text = Text::from(vec![
        Line::from(vec![
            Span::raw("Critical: "),
            Span::styled(app.summary.critical_issues.to_string(), Style::default().fg(Color::Red)),
        ]),
        Line::from(vec![
            Span::raw("Warnings: "),
            Span::styled(app.summary.warning_issues.to_string(), Style::default().fg(Color::Yellow)),
        ]),
        Line::from(vec![
            Span::raw("Info:     "),
            Span::styled(app.summary.info_issues.to_string(), Style::default().fg(Color::Cyan)),
        ]),
    ]);
    frame.render_widget(Paragraph::new(details_text).block(issues_block), summary_chunks[5]);

    let authority_block = Block::default().title("SEARCH INDEX".bold());
    let authority_line = match &report.authority {
        AuthorityStatus::Disabled => Line::from("Disabled (no credentials).".dark_gray()),
        AuthorityStatus::Available(snapshot) => Line::from(vec![
            Span::raw("Indexed pages: "),
            Span::styled(snapshot.indexed_pages.to_string(), Style::default().fg(Color::Cyan)),
        ]),
        AuthorityStatus::Error { message } => {
            Line::from(Span::styled(format!("Lookup failed: {}", message), Style::default().fg(Color::Red)))
        }
    };
    frame.render_widget(Paragraph::new(authority_line).block(authority_block), summary_chunks[6]);
}
