use crate::themes::Theme;
use congestion_core::formatting::format_number;
use ratatui::text::{Line, Span};

/// Decoration placed either side of the application title.
pub const DECORATION: &str = "▚ ▞ ▚ ▞";

/// Width of the `=` rule under the title.
pub const SEPARATOR_WIDTH: usize = 60;

/// Dashboard header rendering four lines:
///
/// 1. Application title with decorations (ALL CAPS).
/// 2. A 60-column `=` separator.
/// 3. Source and record counts in `[ source | matched / total records ]` format.
/// 4. An empty line.
pub struct Header<'a> {
    /// Name of the dataset currently shown (e.g. "congestion.csv").
    pub source: &'a str,
    /// Records passing the current filters.
    pub matched: usize,
    /// Records in the loaded dataset.
    pub total: usize,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(source: &'a str, matched: usize, total: usize, theme: &'a Theme) -> Self {
        Self {
            source,
            matched,
            total,
            theme,
        }
    }

    /// Render the header as exactly four lines.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let counts = format!(
            "{} / {} records",
            format_number(self.matched as f64, 0),
            format_number(self.total as f64, 0),
        );

        vec![
            Line::from(vec![
                Span::styled(DECORATION, self.theme.header_accent),
                Span::styled(" LANE CONGESTION DASHBOARD ", self.theme.header),
                Span::styled(DECORATION, self.theme.header_accent),
            ]),
            Line::from(Span::styled(
                "=".repeat(SEPARATOR_WIDTH),
                self.theme.separator,
            )),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(self.source.to_string(), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(counts, self.theme.value),
                Span::styled(" ]", self.theme.label),
            ]),
            Line::from(""),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_header_to_lines_count() {
        let theme = Theme::dark();
        let lines = Header::new("congestion.csv", 3, 3, &theme).to_lines();
        assert_eq!(lines.len(), 4, "header must produce exactly 4 lines");
    }

    #[test]
    fn test_header_title_line_content() {
        let theme = Theme::dark();
        let lines = Header::new("congestion.csv", 0, 0, &theme).to_lines();
        let title = text(&lines[0]);

        assert!(title.contains("LANE CONGESTION DASHBOARD"), "got: {title}");
        assert!(title.starts_with(DECORATION), "got: {title}");
    }

    #[test]
    fn test_header_separator_line() {
        let theme = Theme::dark();
        let lines = Header::new("x", 0, 0, &theme).to_lines();
        let sep = text(&lines[1]);

        assert_eq!(sep.chars().count(), SEPARATOR_WIDTH);
        assert!(sep.chars().all(|c| c == '='));
    }

    #[test]
    fn test_header_info_line_counts_grouped() {
        let theme = Theme::dark();
        let lines = Header::new("sample_data.csv", 1234, 56789, &theme).to_lines();
        let info = text(&lines[2]);

        assert_eq!(info, "[ sample_data.csv | 1,234 / 56,789 records ]");
        assert_eq!(lines[2].spans.len(), 5);
    }

    #[test]
    fn test_header_empty_fourth_line() {
        let theme = Theme::dark();
        let lines = Header::new("x", 0, 0, &theme).to_lines();
        assert!(text(&lines[3]).is_empty());
    }
}
