//! Filter panel: the terminal's [`FilterSource`].
//!
//! Holds the user's [`FilterSelection`] plus a cursor over the ten fields.
//! Left/right cycles the highlighted field through `All` and the values the
//! current dataset offers for it.

use congestion_core::models::{FilterField, FilterSelection, FilterSource};
use congestion_data::filter::FilterOptions;
use ratatui::text::{Line, Span};

use crate::themes::Theme;

/// Shown for a field with no value selected.
pub const ALL_LABEL: &str = "All";

/// Columns reserved for the field name.
const LABEL_WIDTH: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Next,
    Previous,
}

#[derive(Debug, Clone, Default)]
pub struct FilterPanel {
    pub selection: FilterSelection,
    cursor: usize,
}

impl FilterPanel {
    pub fn new(selection: FilterSelection) -> Self {
        Self {
            selection,
            cursor: 0,
        }
    }

    pub fn selected_field(&self) -> FilterField {
        FilterField::ALL[self.cursor]
    }

    pub fn select_next(&mut self) {
        self.cursor = (self.cursor + 1) % FilterField::ALL.len();
    }

    pub fn select_previous(&mut self) {
        self.cursor = (self.cursor + FilterField::ALL.len() - 1) % FilterField::ALL.len();
    }

    /// Move the highlighted field to the neighbouring option, wrapping through
    /// `All`. Returns `true` when the selection changed.
    ///
    /// A value that is not among the options (for example one given on the
    /// command line) is treated as `All` for positioning.
    pub fn cycle(&mut self, options: &FilterOptions, step: Step) -> bool {
        let field = self.selected_field();
        let values = options_for(options, field);
        let slots = values.len() + 1;

        let current = self
            .selection
            .get(field)
            .and_then(|v| values.iter().position(|o| o == v))
            .map_or(0, |i| i + 1);
        let next = match step {
            Step::Next => (current + 1) % slots,
            Step::Previous => (current + slots - 1) % slots,
        };

        let value = (next > 0).then(|| values[next - 1].clone());
        if value.as_deref() == self.selection.get(field) {
            return false;
        }
        tracing::debug!(field = field.label(), value = ?value, "filter changed");
        self.selection.set(field, value);
        true
    }

    /// Unset the highlighted field. Returns `true` when it had a value.
    pub fn clear_selected(&mut self) -> bool {
        let field = self.selected_field();
        if self.selection.get(field).is_none() {
            return false;
        }
        self.selection.set(field, None);
        true
    }

    /// One line per field, the highlighted one in the selection style.
    pub fn to_lines<'a>(&self, theme: &'a Theme) -> Vec<Line<'a>> {
        FilterField::ALL
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let value = self.selection.get(*field);
                let label = format!("{:<width$}", field.label(), width = LABEL_WIDTH);
                let shown = value.unwrap_or(ALL_LABEL).to_string();

                if i == self.cursor {
                    Line::from(vec![
                        Span::styled(format!("▶ {label}"), theme.selected),
                        Span::styled(format!("◀ {shown} ▶"), theme.selected),
                    ])
                } else {
                    let value_style = if value.is_some() { theme.value } else { theme.dim };
                    Line::from(vec![
                        Span::styled(format!("  {label}"), theme.label),
                        Span::styled(format!("  {shown}"), value_style),
                    ])
                }
            })
            .collect()
    }
}

impl FilterSource for FilterPanel {
    fn value(&self, field: FilterField) -> Option<String> {
        self.selection.value(field)
    }
}

/// The option list that feeds `field`.
///
/// Both date bounds draw from the same list of dates.
pub fn options_for(options: &FilterOptions, field: FilterField) -> &[String] {
    match field {
        FilterField::Year => &options.years,
        FilterField::DateFrom | FilterField::DateTo => &options.dates,
        FilterField::DayName => &options.day_names,
        FilterField::DayType => &options.day_types,
        FilterField::LaneId => &options.lanes,
        FilterField::FromPoint => &options.from_points,
        FilterField::ToPoint => &options.to_points,
        FilterField::Direction => &options.directions,
        FilterField::HourPrefix => &options.hours,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
