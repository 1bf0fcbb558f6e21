// src/ui/widgets/input.rs

use crate::app::{App, AppState};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

/// Renders the URL field. The cursor is shown only while typing.
pub fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let title = match &app.state {
        AppState::Idle => "Target URL",
        _ => "Audited URL",
    };
    let input_block = Block::default().borders(Borders::ALL).title(title);
    let input_paragraph = Paragraph::new(app.input.as_str())
        .block(input_block)
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(input_paragraph, area);

    if let AppState::Idle = app.state {
        frame.set_cursor_position(Position::new(
            area.x + app.input.chars().count() as u16 + 1,
            area.y + 1,
        ));
    }
}
