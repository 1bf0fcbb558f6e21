// src/ui/widgets/analysis_view.rs

use crate::app::{App, AppState, SPINNER_CHARS};
use geo_audit::core::knowledge_base;
use geo_audit::core::models::Severity;
use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::Critical => Style::default().fg(Color::Red),
        Severity::Warning => Style::default().fg(Color::Yellow),
        Severity::Info => Style::default().fg(Color::Cyan),
    }
}

pub fn render_analysis_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let main_block = Block::default()
        .borders(Borders::ALL)
        .title("Recommendations (Navigate with ↑ ↓)");

    let report = match (&app.state, &app.report) {
        (AppState::Finished, Some(report)) => report,
        (AppState::Scanning, _) => {
            let spinner_char = SPINNER_CHARS[app.spinner_frame];
            let content = Paragraph::new(Line::from(vec![
                Span::styled(format!("{} ", spinner_char), Style::default().fg(Color::Cyan)),
                Span::raw("Auditing... Please wait."),
            ]))
            .alignment(Alignment::Center);
            frame.render_widget(content.block(main_block), area);
            return;
        }
        (AppState::Failed(message), _) => {
            let content = Paragraph::new(vec![
                Line::from("AUDIT FAILED".bold().fg(Color::Red)),
                Line::from(""),
                Line::from(message.as_str()),
            ])
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Center);
            frame.render_widget(content.block(main_block), area);
            return;
        }
        _ => {
            let content = Paragraph::new("Audit results will appear here...").alignment(Alignment::Center);
            frame.render_widget(content.block(main_block), area);
            return;
        }
    };

    let inner_area = main_block.inner(area);
    frame.render_widget(main_block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Min(0)])
        .split(inner_area);

    let items: Vec<ListItem> = report
        .recommendations
        .iter()
        .map(|rec| {
            let line = Line::from(vec![
                Span::styled(format!("[{}] ", rec.category), Style::default().fg(Color::DarkGray)),
                Span::styled(rec.message.clone(), severity_style(rec.severity)),
            ]);
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default())
        .highlight_style(Style::new().bg(Color::DarkGray).add_modifier(Modifier::BOLD));

    let selected = app
        .analysis_list_state
        .selected()
        .and_then(|i| report.recommendations.get(i))
        .map(|rec| (rec.code.clone(), rec.message.clone()));
    let has_recommendations = !report.recommendations.is_empty();
    let summary_text = report.qualitative_summary.clone();

    frame.render_stateful_widget(list, chunks[0], &mut app.analysis_list_state);

    let detail_block = Block::default().borders(Borders::TOP).title("Details");
    match selected.and_then(|(code, message)| knowledge_base::get_finding_detail(&code).map(|d| (d, message))) {
        Some((detail, message)) => {
            let text = vec![
                Line::from(detail.title.bold()),
                Line::from(message),
                Line::from(""),
                Line::from("WHY IT MATTERS:".yellow().bold()),
                Line::from(detail.description),
                Line::from(""),
                Line::from("HOW TO FIX:".yellow().bold()),
                Line::from(detail.remediation),
            ];
            let p = Paragraph::new(text).wrap(Wrap { trim: true }).block(detail_block);
            frame.render_widget(p, chunks[1]);
        }
        None => render_placeholder_details(frame, has_recommendations, summary_text, detail_block, chunks[1]),
    }
}

fn render_placeholder_details(
    frame: &mut Frame,
    has_recommendations: bool,
    summary: Option<String>,
    block: Block,
    area: Rect,
) {
    let mut lines = if has_recommendations {
        vec![Line::from("Select an item above to see details.")]
    } else {
        vec![
            Line::from(""),
            Line::from("✓ READY FOR GENERATIVE ENGINES".bold().fg(Color::Green)),
            Line::from(""),
            Line::from("No recommendations: every module passed its checks."),
        ]
    };
    if let Some(summary) = summary {
        lines.push(Line::from(""));
        lines.push(Line::from("ASSESSMENT:".yellow().bold()));
        lines.push(Line::from(summary));
    }

    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(p, area);
}
