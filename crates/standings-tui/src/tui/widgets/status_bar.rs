// Status bar widget: title, loaded file, loading indicator, active sort.
// Also renders the message line (error banner) and the help bar.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use standings_core::sort::SortState;

use crate::tui::ViewState;

/// Render the status bar into the given area.
///
/// Layout: [title] [file name: status] [loading] [sort]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = vec![Span::styled(
        " Standings ",
        Style::default()
            .fg(Color::Black)
            .bg(Color::White)
            .add_modifier(Modifier::BOLD),
    )];

    spans.push(Span::raw(" "));
    spans.push(Span::styled(
        file_text(state),
        Style::default().fg(Color::White),
    ));

    if state.loading {
        spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
        spans.push(Span::styled(
            "Loading...",
            Style::default().fg(Color::Yellow),
        ));
    }

    spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
    spans.push(Span::styled(
        sort_text(&state.sort),
        Style::default().fg(Color::Cyan),
    ));

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// "name: status", or a hint when nothing has been loaded from a file.
pub fn file_text(state: &ViewState) -> String {
    match &state.file {
        Some(file) => format!("{}: {}", file.name, file.status),
        None => "No file loaded".to_string(),
    }
}

pub fn sort_text(sort: &SortState) -> String {
    format!("Sort: {} {}", sort.field.label(), sort.direction.arrow())
}

/// Error banner line; empty when there is no error.
pub fn render_message(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(error) = &state.error else {
        return;
    };
    let paragraph = Paragraph::new(Line::from(Span::styled(
        format!(" ! {error}  (Esc to dismiss)"),
        Style::default().fg(Color::White),
    )))
    .style(Style::default().bg(Color::Red));
    frame.render_widget(paragraph, area);
}

pub fn render_help(frame: &mut Frame, area: Rect, state: &ViewState) {
    let text = if state.path_input_mode {
        " Enter:Load | Esc:Cancel"
    } else {
        " q:Quit | 1:Place 2:HP 3:Record 4:Net worth | o:Open file | j/k:Scroll"
    };
    let paragraph = Paragraph::new(Line::from(Span::styled(
        text,
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::DIM),
    )))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::FileInfo;
    use standings_core::sort::{SortDirection, SortField};

    #[test]
    fn file_text_defaults_to_hint() {
        let state = ViewState::default();
        assert_eq!(file_text(&state), "No file loaded");
    }

    #[test]
    fn file_text_shows_name_and_status() {
        let mut state = ViewState::default();
        state.file = Some(FileInfo {
            name: "scoreboard_data.json".into(),
            status: "Auto-loaded".into(),
        });
        assert_eq!(file_text(&state), "scoreboard_data.json: Auto-loaded");
    }

    #[test]
    fn sort_text_includes_arrow() {
        let sort = SortState {
            field: SortField::Networth,
            direction: SortDirection::Descending,
        };
        assert_eq!(sort_text(&sort), "Sort: Net Worth ▼");
    }

    #[test]
    fn render_does_not_panic_with_defaults() {
        let backend = ratatui::backend::TestBackend::new(80, 3);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.error = Some("Error loading file: boom".into());
        terminal
            .draw(|frame| {
                render(frame, Rect::new(0, 0, 80, 1), &state);
                render_message(frame, Rect::new(0, 1, 80, 1), &state);
                render_help(frame, Rect::new(0, 2, 80, 1), &state);
            })
            .unwrap();
    }
}
