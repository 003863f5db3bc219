use crate::themes::Theme;
use congestion_core::formatting::{format_number, percentage};
use ratatui::text::{Line, Span};

/// Configuration controlling visual appearance of a progress bar.
pub struct ProgressBarConfig {
    /// Width in terminal columns of the bar portion (excluding label).
    pub width: u16,
    pub filled_char: char,
    pub empty_char: char,
}

impl Default for ProgressBarConfig {
    fn default() -> Self {
        Self {
            width: 20,
            filled_char: '\u{2588}', // █  FULL BLOCK
            empty_char: '\u{2591}',  // ░  LIGHT SHADE
        }
    }
}

// ── CoverageBar ───────────────────────────────────────────────────────────────

/// Share of the loaded records that pass the current filters.
///
/// Renders as a filled + empty bar followed by `" 66.7%"`.
pub struct CoverageBar<'a> {
    /// Matched share in `[0.0, 100.0]`.
    pub percentage: f64,
    pub matched: usize,
    pub total: usize,
    pub theme: &'a Theme,
    pub config: ProgressBarConfig,
}

impl<'a> CoverageBar<'a> {
    pub fn new(matched: usize, total: usize, theme: &'a Theme) -> Self {
        let percentage = percentage(matched as f64, total as f64, 1).clamp(0.0, 100.0);
        Self {
            percentage,
            matched,
            total,
            theme,
            config: ProgressBarConfig::default(),
        }
    }

    pub fn with_width(mut self, width: u16) -> Self {
        self.config.width = width;
        self
    }

    /// Render as a [`Line`]. A zero total renders an empty bar at 0.0%.
    pub fn to_line(&self) -> Line<'a> {
        let filled = ((self.percentage / 100.0) * self.config.width as f64).round() as u16;
        let filled = filled.min(self.config.width);
        let empty = self.config.width - filled;

        let filled_str: String =
            std::iter::repeat(self.config.filled_char).take(filled as usize).collect();
        let empty_str: String =
            std::iter::repeat(self.config.empty_char).take(empty as usize).collect();

        Line::from(vec![
            Span::styled(filled_str, self.theme.info),
            Span::styled(empty_str, self.theme.dim),
            Span::styled(format!(" {:.1}%", self.percentage), self.theme.value),
        ])
    }

    /// `"2 / 3 matched"` with thousands separators.
    pub fn label(&self) -> String {
        format!(
            "{} / {} matched",
            format_number(self.matched as f64, 0),
            format_number(self.total as f64, 0)
        )
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
