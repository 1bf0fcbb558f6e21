// src/ui/layout.rs

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Defines the areas of the application's user interface.
///
/// `log_panel` is an empty `Rect` while the log panel is hidden.
pub struct AppLayout {
    pub input: Rect,
    pub report: Rect,
    pub summary: Rect,
    pub footer: Rect,
    pub log_panel: Rect,
}

/// Creates the complete application layout.
///
/// Three vertical bands: the URL input, the content area and a one-line
/// footer. The content area holds the recommendations and the summary side
/// by side, plus the log panel when `show_logs` is set.
pub fn create_layout(frame_size: Rect, show_logs: bool) -> AppLayout {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame_size);

    let content_constraints = if show_logs {
        vec![Constraint::Percentage(45), Constraint::Percentage(25), Constraint::Percentage(30)]
    } else {
        vec![Constraint::Percentage(65), Constraint::Percentage(35)]
    };

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(content_constraints)
        .split(main_chunks[1]);

    AppLayout {
        input: main_chunks[0],
        report: content_chunks[0],
        summary: content_chunks[1],
        log_panel: if show_logs { content_chunks[2] } else { Rect::default() },
        footer: main_chunks[2],
    }
}
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_panel_only_when_shown() {
        let area = Rect::new(0, 0, 120, 40);
        assert_eq!(create_layout(area, false).log_panel, Rect::default());

        let layout = create_layout(area, true);
        assert!(layout.log_panel.width > 0);
        assert_eq!(layout.input.height, 3);
        assert_eq!(layout.footer.height, 1);
    }
}
