// Metadata panel: extraction summary for the latest snapshot.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use standings_core::snapshot::Metadata;

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let line = match &state.metadata {
        Some(metadata) => summary_line(metadata),
        None => Line::from(Span::styled(
            "No metadata",
            Style::default().fg(Color::DarkGray),
        )),
    };

    let paragraph =
        Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("Metadata"));
    frame.render_widget(paragraph, area);
}

/// Label/value pairs shown in the panel, in display order. Optional
/// extractor fields are only listed when present.
pub fn summary_fields(metadata: &Metadata) -> Vec<(&'static str, String)> {
    let summary = metadata.extraction_summary.clone().unwrap_or_default();
    let mut fields = vec![
        ("Players", metadata.total_players.unwrap_or(0).to_string()),
        ("Extraction", format_extraction_time(metadata.extraction_time)),
        ("Crew units", summary.total_crew_units.unwrap_or(0).to_string()),
        ("Bench units", summary.total_bench_units.unwrap_or(0).to_string()),
    ];

    let counters = [
        ("Named", summary.players_with_names),
        ("With HP", summary.players_with_health),
        ("With record", summary.players_with_record),
        ("With net worth", summary.players_with_networth),
    ];
    for (label, value) in counters {
        if let Some(value) = value {
            fields.push((label, value.to_string()));
        }
    }

    if let Some(headers) = metadata.headers_found.as_ref().filter(|h| !h.is_empty()) {
        fields.push(("Headers", headers.join(",")));
    }
    if let Some(at) = &metadata.extracted_at {
        fields.push(("At", at.clone()));
    }
    fields
}

/// Seconds with three decimals, "0.000s" when unknown.
pub fn format_extraction_time(seconds: Option<f64>) -> String {
    format!("{:.3}s", seconds.unwrap_or(0.0))
}

fn summary_line(metadata: &Metadata) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, (label, value)) in summary_fields(metadata).into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
        }
        spans.push(Span::styled(
            format!("{label}: "),
            Style::default().fg(Color::Gray),
        ));
        spans.push(Span::styled(value, Style::default().fg(Color::White)));
    }
    Line::from(spans)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use standings_core::snapshot::ExtractionSummary;

    #[test]
    fn extraction_time_has_three_decimals() {
        assert_eq!(format_extraction_time(Some(0.42137)), "0.421s");
        assert_eq!(format_extraction_time(None), "0.000s");
    }

    #[test]
    fn minimal_metadata_shows_core_fields() {
        let fields = summary_fields(&Metadata::default());
        let labels: Vec<&str> = fields.iter().map(|(l, _)| *l).collect();
        assert_eq!(labels, vec!["Players", "Extraction", "Crew units", "Bench units"]);
        assert_eq!(fields[0].1, "0");
    }

    #[test]
    fn optional_fields_are_appended() {
        let metadata = Metadata {
            total_players: Some(8),
            extraction_time: Some(1.5),
            extraction_summary: Some(ExtractionSummary {
                total_crew_units: Some(30),
                total_bench_units: Some(4),
                players_with_health: Some(7),
                ..Default::default()
            }),
            headers_found: Some(vec!["HEALTH".into(), "RECORD".into()]),
            extracted_at: None,
        };
        let fields = summary_fields(&metadata);
        assert_eq!(fields[2], ("Crew units", "30".to_string()));
        assert!(fields.contains(&("With HP", "7".to_string())));
        assert!(fields.contains(&("Headers", "HEALTH,RECORD".to_string())));
        assert!(!fields.iter().any(|(l, _)| *l == "Named"));
    }

    #[test]
    fn render_does_not_panic_with_defaults() {
        let backend = ratatui::backend::TestBackend::new(80, 3);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = ViewState::default();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
