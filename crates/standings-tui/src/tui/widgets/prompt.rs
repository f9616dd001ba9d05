// Modal overlays: quit confirmation and the snapshot file path prompt.
//
// Both render as a centered box on top of the main layout.

use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

const QUIT_WIDTH: u16 = 28;
const PATH_WIDTH: u16 = 64;
const DIALOG_HEIGHT: u16 = 3;

pub fn render_quit_confirm(frame: &mut Frame, area: Rect) {
    let text = Line::from(vec![
        Span::raw(" Really quit? ("),
        Span::styled("y", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        Span::raw("/"),
        Span::styled("n", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        Span::raw(")"),
    ]);
    render_dialog(frame, area, QUIT_WIDTH, " Quit? ", Color::Yellow, text);
}

/// Path entry box; shows the tail of the input when it is wider than the box.
pub fn render_path_input(frame: &mut Frame, area: Rect, input: &str) {
    let room = PATH_WIDTH.saturating_sub(4) as usize;
    let text = Line::from(vec![
        Span::raw(" "),
        Span::styled(visible_tail(input, room), Style::default().fg(Color::White)),
        Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
    ]);
    render_dialog(frame, area, PATH_WIDTH, " Open snapshot file ", Color::Cyan, text);
}

fn render_dialog(
    frame: &mut Frame,
    area: Rect,
    width: u16,
    title: &'static str,
    color: Color,
    text: Line<'static>,
) {
    let dialog_area = centered_rect(width, DIALOG_HEIGHT, area);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(Span::styled(
            title,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));

    let paragraph = Paragraph::new(text)
        .block(block)
        .style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, dialog_area);
}

/// The last `room` characters of `input`.
pub fn visible_tail(input: &str, room: usize) -> String {
    let count = input.chars().count();
    input.chars().skip(count.saturating_sub(room)).collect()
}

/// Compute a centered rectangle of the given size within `area`, clamped to
/// the available space.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .split(area);

    Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .split(vertical[0])[0]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_is_centered() {
        let area = Rect::new(0, 0, 80, 24);
        let result = centered_rect(QUIT_WIDTH, DIALOG_HEIGHT, area);
        assert_eq!(result.width, QUIT_WIDTH);
        assert_eq!(result.height, DIALOG_HEIGHT);
        let dx = (result.x + result.width / 2) as i32 - 40;
        let dy = (result.y + result.height / 2) as i32 - 12;
        assert!(dx.abs() <= 1 && dy.abs() <= 1, "off center: {result:?}");
    }

    #[test]
    fn centered_rect_clamps_to_small_area() {
        let area = Rect::new(0, 0, 10, 2);
        let result = centered_rect(PATH_WIDTH, DIALOG_HEIGHT, area);
        assert!(result.width <= area.width);
        assert!(result.height <= area.height);
    }

    #[test]
    fn visible_tail_keeps_end_of_path() {
        assert_eq!(visible_tail("/tmp/data.json", 9), "data.json");
        assert_eq!(visible_tail("a.json", 20), "a.json");
    }

    #[test]
    fn dialogs_render_without_panic() {
        let backend = ratatui::backend::TestBackend::new(80, 24);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| {
                render_quit_confirm(frame, frame.area());
                render_path_input(frame, frame.area(), "output/scoreboard_data.json");
            })
            .unwrap();
    }
}
