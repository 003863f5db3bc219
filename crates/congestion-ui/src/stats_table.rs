//! Histogram statistics table.
//!
//! Renders a bordered [`ratatui::widgets::Table`] with one row per marker
//! statistic (value and the bin it falls in) followed by min, max and count.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use congestion_core::formatting;
use congestion_data::aggregator::{Histogram, StatKind};

use crate::themes::Theme;

/// One display row: statistic name, value, and bin label.
#[derive(Debug, Clone, PartialEq)]
pub struct StatRow {
    pub kind: StatKind,
    pub value: String,
    pub bin: String,
}

/// Rows for every marker, in [`StatKind::ALL`] order.
pub fn build_stat_rows(histogram: &Histogram) -> Vec<StatRow> {
    StatKind::ALL
        .iter()
        .filter_map(|kind| histogram.marker(*kind))
        .map(|marker| StatRow {
            kind: marker.kind,
            value: formatting::format_number(marker.value, 1),
            bin: histogram
                .labels
                .get(marker.bin_index)
                .cloned()
                .unwrap_or_default(),
        })
        .collect()
}

/// Render the statistics table into `area`.
pub fn render_stats_table(frame: &mut Frame, area: Rect, histogram: &Histogram, theme: &Theme) {
    let header = Row::new(
        ["Statistic", "Value", "Bin"]
            .iter()
            .map(|h| Cell::from(*h).style(theme.label)),
    )
    .height(1);

    let mut rows: Vec<Row> = build_stat_rows(histogram)
        .into_iter()
        .map(|row| {
            let style = theme.marker_style(row.kind);
            Row::new(vec![
                Cell::from(Span::styled(format!("■ {}", row.kind.name()), style)),
                Cell::from(row.value),
                Cell::from(row.bin),
            ])
        })
        .collect();

    let summary = &histogram.summary;
    for (name, value) in [("Min", summary.min), ("Max", summary.max)] {
        rows.push(
            Row::new(vec![
                Cell::from(format!("  {name}")),
                Cell::from(formatting::format_number(value, 1)),
                Cell::from(""),
            ])
            .style(theme.dim),
        );
    }
    rows.push(
        Row::new(vec![
            Cell::from("  Count"),
            Cell::from(formatting::format_number(summary.count as f64, 0)),
            Cell::from(""),
        ])
        .style(theme.value),
    );

    let widths = [
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Min(7),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border)
                .title(" Statistics "),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Compact marker legend such as `"Average: 12.5  Median: 11.0"`.
pub fn build_legend_line<'a>(histogram: &Histogram, theme: &'a Theme) -> Line<'a> {
    let mut spans = Vec::new();
    for marker in &histogram.markers {
        if !spans.is_empty() {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(
            marker.label.clone(),
            theme.marker_style(marker.kind),
        ));
    }
    Line::from(spans)
}

/// Placeholder when no record passes the filters.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No records match the current filters", theme.warning)),
        Line::from(""),
        Line::from(Span::styled("Press 'c' to clear all filters", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border)
                .title(" Statistics "),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
