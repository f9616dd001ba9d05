// Change bar: short-lived per-player delta indicators, most recent first.

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use standings_core::ledger::{ChangeEvent, ChangeKind};

/// Display text for one change event, e.g. "+50g", "-12hp", "Lv+1".
pub fn event_label(event: &ChangeEvent) -> String {
    let sign = if event.delta > 0 { "+" } else { "" };
    match event.kind {
        ChangeKind::Gold => format!("{sign}{}g", event.delta),
        ChangeKind::Health => format!("{sign}{}hp", event.delta),
        ChangeKind::Level => format!("Lv{sign}{}", event.delta),
        ChangeKind::Bench => "Bench".to_string(),
        ChangeKind::Crew => "Crew".to_string(),
    }
}

/// Color for one change event. Gains and losses differ for gold and health.
pub fn event_color(event: &ChangeEvent) -> Color {
    match event.kind {
        ChangeKind::Gold if event.delta < 0 => Color::Yellow,
        ChangeKind::Gold => Color::LightGreen,
        ChangeKind::Health if event.delta < 0 => Color::Red,
        ChangeKind::Health => Color::Green,
        ChangeKind::Level => Color::Cyan,
        ChangeKind::Bench | ChangeKind::Crew => Color::Gray,
    }
}

/// One line holding every visible event, space separated.
pub fn bar_line(events: &[ChangeEvent]) -> Line<'static> {
    let mut spans = Vec::with_capacity(events.len() * 2);
    for (i, event) in events.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(
            event_label(event),
            Style::default().fg(event_color(event)),
        ));
    }
    Line::from(spans)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
