//! Main dashboard screen.
//!
//! ```text
//! ┌ header ─────────────────────────────────────────────────────┐
//! │ filters │ monthly line chart     │ hourly line chart        │
//! │         ├────────────────────────┴──────────┬───────────────┤
//! │         │ histogram bar chart               │ statistics    │
//! ├─────────┴───────────────────────────────────┴───────────────┤
//! │ notice bar / key help                                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every function here only reads a [`DashboardUpdate`]; nothing is computed
//! beyond turning series into chart points.

use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    symbols,
    text::{Line, Span, Text},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph,
    },
    Frame,
};

use congestion_core::formatting::format_number;
use congestion_core::time_utils::MONTH_LABELS;
use congestion_data::aggregator::{Histogram, HourlyProfile, MonthlySeries, StatKind};
use congestion_runtime::dashboard::DashboardState;
use congestion_runtime::orchestrator::DashboardUpdate;

use crate::components::filter_panel::FilterPanel;
use crate::components::header::Header;
use crate::components::indicators::{NoticeIndicator, StateIndicator};
use crate::components::progress_bar::CoverageBar;
use crate::stats_table;
use crate::themes::Theme;

/// Width of the filter column, borders included.
const FILTER_PANEL_WIDTH: u16 = 34;

/// Hour-axis ticks; bounds run to 24 so the five labels land on whole hours.
const HOUR_TICKS: [&str; 5] = ["00", "06", "12", "18", "24"];

pub const KEY_HELP: &str =
    "↑/↓ field  ←/→ value  Del clear field  c clear all  r reload  q quit";

// ── Chart data ────────────────────────────────────────────────────────────────

/// `(x, y)` points for one chart line.
#[derive(Debug, Clone, PartialEq)]
pub struct LinePoints {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

/// One line per year, x = month index 0..=11.
pub fn monthly_points(monthly: &MonthlySeries) -> Vec<LinePoints> {
    monthly
        .years
        .iter()
        .map(|series| LinePoints {
            name: series.year.to_string(),
            points: series
                .values
                .iter()
                .enumerate()
                .map(|(m, v)| (m as f64, *v))
                .collect(),
        })
        .collect()
}

/// One line per recognized day type, x = hour 0..=23.
pub fn hourly_points(hourly: &HourlyProfile) -> Vec<LinePoints> {
    hourly
        .series
        .iter()
        .map(|series| LinePoints {
            name: series.day_type.label().to_string(),
            points: series
                .values
                .iter()
                .enumerate()
                .map(|(h, v)| (h as f64, *v))
                .collect(),
        })
        .collect()
}

/// Upper y bound with a little headroom; never zero.
fn y_upper(max: f64) -> f64 {
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

fn y_labels<'a>(upper: f64, theme: &Theme) -> Vec<Span<'a>> {
    [0.0, upper / 2.0, upper]
        .iter()
        .map(|v| Span::styled(format_number(*v, 1), theme.dim))
        .collect()
}

/// Marker to colour a histogram bin with, the first in [`StatKind::ALL`]
/// order that falls into it.
pub fn bin_marker(histogram: &Histogram, bin: usize) -> Option<StatKind> {
    StatKind::ALL
        .iter()
        .copied()
        .find(|kind| histogram.marker(*kind).is_some_and(|m| m.bin_index == bin))
}

// ── Main render ───────────────────────────────────────────────────────────────

/// Render the full dashboard for `data` into `area`.
pub fn render_dashboard(
    frame: &mut Frame,
    area: Rect,
    data: &DashboardUpdate,
    panel: &FilterPanel,
    source: &str,
    now: DateTime<Utc>,
    theme: &Theme,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(10),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Header::new(source, data.matched_records, data.total_records, theme);
    frame.render_widget(Paragraph::new(Text::from(header.to_lines())), rows[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(FILTER_PANEL_WIDTH), Constraint::Min(40)])
        .split(rows[1]);
    render_filter_panel(frame, body[0], data, panel, theme);

    let charts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(body[1]);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(charts[0]);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(36)])
        .split(charts[1]);

    render_monthly_chart(frame, top[0], &data.monthly, theme);
    render_hourly_chart(frame, top[1], &data.hourly, theme);
    match &data.histogram {
        Some(histogram) => {
            render_histogram(frame, bottom[0], histogram, theme);
            stats_table::render_stats_table(frame, bottom[1], histogram, theme);
        }
        None => {
            render_empty_histogram(frame, bottom[0], theme);
            stats_table::render_no_data(frame, bottom[1], theme);
        }
    }

    let notice = NoticeIndicator::latest_visible(&data.notices, now, theme);
    frame.render_widget(Paragraph::new(notice.to_line()), rows[2]);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(KEY_HELP, theme.dim))),
        rows[3],
    );
}

/// Shown before the first snapshot arrives and while the first load runs.
pub fn render_loading(frame: &mut Frame, area: Rect, state: DashboardState, theme: &Theme) {
    let text = vec![
        Line::from(""),
        StateIndicator::new(state, theme).to_line(),
        Line::from(""),
        Line::from(Span::styled("Reading congestion data...", theme.dim)),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border)
                .title(" Lane Congestion "),
        ),
        area,
    );
}

// ── Panels ────────────────────────────────────────────────────────────────────

fn render_filter_panel(
    frame: &mut Frame,
    area: Rect,
    data: &DashboardUpdate,
    panel: &FilterPanel,
    theme: &Theme,
) {
    let lines = build_filter_panel_lines(data, panel, theme);
    frame.render_widget(
        Paragraph::new(Text::from(lines)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border)
                .title(" Filters "),
        ),
        area,
    );
}

/// Field rows, then state and coverage (extracted for testability).
pub fn build_filter_panel_lines<'a>(
    data: &DashboardUpdate,
    panel: &FilterPanel,
    theme: &'a Theme,
) -> Vec<Line<'a>> {
    let coverage = CoverageBar::new(data.matched_records, data.total_records, theme)
        .with_width(FILTER_PANEL_WIDTH.saturating_sub(10));

    let mut lines = panel.to_lines(theme);
    lines.push(Line::from(""));
    lines.push(StateIndicator::new(data.state, theme).to_line());
    lines.push(coverage.to_line());
    lines.push(Line::from(Span::styled(coverage.label(), theme.dim)));
    lines
}

fn render_monthly_chart(frame: &mut Frame, area: Rect, monthly: &MonthlySeries, theme: &Theme) {
    let lines = monthly_points(monthly);
    let datasets: Vec<Dataset> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            Dataset::default()
                .name(line.name.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(theme.year_style(i))
                .data(&line.points)
        })
        .collect();

    let upper = y_upper(monthly.max_value());
    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border)
                .title(" Monthly average "),
        )
        .x_axis(
            Axis::default()
                .style(theme.dim)
                .bounds([0.0, (MONTH_LABELS.len() - 1) as f64])
                .labels(MONTH_LABELS.iter().map(|m| Span::styled(*m, theme.dim))),
        )
        .y_axis(
            Axis::default()
                .style(theme.dim)
                .bounds([0.0, upper])
                .labels(y_labels(upper, theme)),
        );
    frame.render_widget(chart, area);
}

fn render_hourly_chart(frame: &mut Frame, area: Rect, hourly: &HourlyProfile, theme: &Theme) {
    let lines = hourly_points(hourly);
    let datasets: Vec<Dataset> = lines
        .iter()
        .zip(&hourly.series)
        .map(|(line, series)| {
            Dataset::default()
                .name(line.name.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(theme.day_type_style(&series.day_type))
                .data(&line.points)
        })
        .collect();

    let upper = y_upper(hourly.max_value());
    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border)
                .title(" Hourly profile by day type "),
        )
        .x_axis(
            Axis::default()
                .style(theme.dim)
                .bounds([0.0, 24.0])
                .labels(HOUR_TICKS.iter().map(|h| Span::styled(*h, theme.dim))),
        )
        .y_axis(
            Axis::default()
                .style(theme.dim)
                .bounds([0.0, upper])
                .labels(y_labels(upper, theme)),
        );
    frame.render_widget(chart, area);
}

/// Bars for every bin; marker bins take the marker's colour.
pub fn histogram_bars<'a>(histogram: &Histogram, theme: &Theme) -> Vec<Bar<'a>> {
    histogram
        .counts
        .iter()
        .zip(&histogram.labels)
        .enumerate()
        .map(|(i, (count, label))| {
            let style = bin_marker(histogram, i)
                .map(|kind| theme.marker_style(kind))
                .unwrap_or(theme.histogram_bar);
            Bar::default()
                .value(*count as u64)
                .label(Line::from(label.clone()))
                .style(style)
        })
        .collect()
}

fn render_histogram(frame: &mut Frame, area: Rect, histogram: &Histogram, theme: &Theme) {
    let bars = histogram_bars(histogram, theme);
    let slots = histogram.counts.len().max(1) as u16;
    let bar_width = (area.width.saturating_sub(2) / slots).saturating_sub(1).max(1);

    let title = Line::from(vec![
        Span::raw(" Distribution  "),
        Span::styled(
            format!("{} records ", format_number(histogram.total() as f64, 0)),
            theme.dim,
        ),
    ]);

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border)
                .title(title)
                .title_bottom(stats_table::build_legend_line(histogram, theme)),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1)
        .max(histogram.max_frequency().max(1) as u64);
    frame.render_widget(chart, area);
}

fn render_empty_histogram(frame: &mut Frame, area: Rect, theme: &Theme) {
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled("No data", theme.dim))).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border)
                .title(" Distribution "),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
