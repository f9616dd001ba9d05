// Scoreboard widget: the pinned prefix table and the detail table.
//
// Both tables draw the same slice of rows so a player's prefix and detail
// cells stay on the same line. Sortable headers show an arrow on the active
// column.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

use standings_core::snapshot::Unit;
use standings_core::sort::{SortField, SortState};

use crate::tui::rows::format_optional;
use crate::tui::widgets::change_bar;
use crate::tui::ViewState;

/// Render both halves of the scoreboard.
pub fn render(frame: &mut Frame, prefix_area: Rect, detail_area: Rect, state: &ViewState) {
    if state.prefix_rows.is_empty() {
        let text = if state.loading {
            "  Loading..."
        } else {
            "  Waiting for scoreboard data. Press o to open a file."
        };
        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title("Scoreboard"));
        frame.render_widget(paragraph, prefix_area.union(detail_area));
        return;
    }

    // Visible row count: borders and header.
    let visible_rows = (prefix_area.height as usize).saturating_sub(3).max(1);
    let offset = clamp_offset(state.scroll_offset, state.prefix_rows.len(), visible_rows);

    render_prefix(frame, prefix_area, state, offset, visible_rows);
    render_detail(frame, detail_area, state, offset, visible_rows);
}

fn render_prefix(frame: &mut Frame, area: Rect, state: &ViewState, offset: usize, visible: usize) {
    let header = header_row(&[
        header_cell(SortField::Position, &state.sort),
        "Changes".to_string(),
        "Player".to_string(),
        "Lv".to_string(),
        "Gold".to_string(),
    ]);

    let rows: Vec<Row> = state
        .prefix_rows
        .iter()
        .skip(offset)
        .take(visible)
        .map(|r| {
            let bar = state
                .change_bars
                .get(&r.player_id)
                .map(|events| change_bar::bar_line(events))
                .unwrap_or_default();
            Row::new(vec![
                Cell::from(r.place.to_string()),
                Cell::from(bar),
                Cell::from(r.name.clone()),
                Cell::from(r.level.to_string()).style(Style::default().fg(Color::Cyan)),
                Cell::from(r.gold.to_string()).style(Style::default().fg(Color::Yellow)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Length(22),
        Constraint::Min(14),
        Constraint::Length(3),
        Constraint::Length(5),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Standings"));
    frame.render_widget(table, area);
}

fn render_detail(frame: &mut Frame, area: Rect, state: &ViewState, offset: usize, visible: usize) {
    let header = header_row(&[
        header_cell(SortField::Health, &state.sort),
        header_cell(SortField::Record, &state.sort),
        header_cell(SortField::Networth, &state.sort),
        "Crew".to_string(),
        "Bench".to_string(),
    ]);

    let rows: Vec<Row> = state
        .detail_rows
        .iter()
        .skip(offset)
        .take(visible)
        .map(|r| {
            Row::new(vec![
                Cell::from(format_optional(r.health)).style(health_style(r.health)),
                Cell::from(r.record.clone()),
                Cell::from(format_optional(r.networth)),
                Cell::from(format_units(&r.crew)),
                Cell::from(format_units(&r.bench)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(5),
        Constraint::Length(7),
        Constraint::Length(10),
        Constraint::Min(20),
        Constraint::Min(12),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Details"));
    frame.render_widget(table, area);
}

fn header_row(labels: &[String]) -> Row<'static> {
    Row::new(
        labels
            .iter()
            .map(|l| Cell::from(Line::from(Span::raw(l.clone()))))
            .collect::<Vec<_>>(),
    )
    .style(
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )
}

/// Header label for a sortable column, with an arrow when it is active.
pub fn header_cell(field: SortField, sort: &SortState) -> String {
    if field == sort.field {
        format!("{}{}", field.label(), sort.direction.arrow())
    } else {
        field.label().to_string()
    }
}

/// Compact unit list: hero name followed by one star per displayed rank.
pub fn format_units(units: &[Unit]) -> String {
    units
        .iter()
        .map(|u| {
            let stars = "*".repeat(u.displayed_stars() as usize);
            format!("{}{}", u.hero(), stars)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn health_style(health: Option<i64>) -> Style {
    match health {
        Some(hp) if hp <= 20 => Style::default().fg(Color::Red),
        Some(_) => Style::default().fg(Color::Green),
        None => Style::default().fg(Color::DarkGray),
    }
}

/// Keep the offset within the rows that exist.
pub fn clamp_offset(offset: usize, total: usize, visible: usize) -> usize {
    offset.min(total.saturating_sub(visible))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
