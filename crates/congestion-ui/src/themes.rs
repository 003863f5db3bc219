use congestion_core::models::DayType;
use congestion_core::notifications::NoticeLevel;
use congestion_data::aggregator::StatKind;
use ratatui::style::{Color, Modifier, Style};

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
    Unknown,
}

/// Detect terminal background type from the `COLORFGBG` environment variable.
///
/// The variable has the format `"foreground;background"`. Background values
/// 0–6 are considered dark; 7–15 are considered light. If the variable is
/// absent or unparseable, `BackgroundType::Dark` is returned.
pub fn detect_background() -> BackgroundType {
    if let Ok(val) = std::env::var("COLORFGBG") {
        if let Some(bg) = val.split(';').next_back() {
            if let Ok(bg_num) = bg.parse::<u8>() {
                return if bg_num <= 6 {
                    BackgroundType::Dark
                } else {
                    BackgroundType::Light
                };
            }
        }
    }
    BackgroundType::Dark
}

/// Every style the dashboard draws with.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Header ───────────────────────────────────────────────────────────────
    pub header: Style,
    pub header_accent: Style,
    pub separator: Style,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub text: Style,
    pub dim: Style,
    pub label: Style,
    pub value: Style,

    // ── Status ───────────────────────────────────────────────────────────────
    pub info: Style,
    pub success: Style,
    pub warning: Style,
    pub error: Style,

    // ── Panels ───────────────────────────────────────────────────────────────
    pub border: Style,
    /// Highlighted row of the filter panel.
    pub selected: Style,

    // ── Charts ───────────────────────────────────────────────────────────────
    /// Cycled through for one line per year.
    pub year_palette: Vec<Color>,
    pub workday: Style,
    pub holiday: Style,
    pub saturday: Style,
    pub histogram_bar: Style,
    /// Bars holding the average or median.
    pub marker_central: Style,
    /// Bars holding P5 or P95.
    pub marker_tail: Style,
    /// Bars holding P25 or P75.
    pub marker_quartile: Style,
}

impl Theme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Dark-background terminal theme (default).
    pub fn dark() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            header_accent: Style::default().fg(Color::Yellow),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),
            value: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Cyan),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),

            border: Style::default().fg(Color::DarkGray),
            selected: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),

            year_palette: vec![
                Color::Cyan,
                Color::Magenta,
                Color::Yellow,
                Color::Green,
                Color::LightBlue,
                Color::LightRed,
            ],
            workday: Style::default().fg(Color::Cyan),
            holiday: Style::default().fg(Color::Magenta),
            saturday: Style::default().fg(Color::Yellow),
            histogram_bar: Style::default().fg(Color::Blue),
            marker_central: Style::default().fg(Color::Red),
            marker_tail: Style::default().fg(Color::Yellow),
            marker_quartile: Style::default().fg(Color::Green),
        }
    }

    /// Light-background terminal theme.
    pub fn light() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            header_accent: Style::default().fg(Color::Magenta),
            separator: Style::default().fg(Color::Gray),

            text: Style::default().fg(Color::Black),
            dim: Style::default().fg(Color::Gray),
            label: Style::default().fg(Color::DarkGray),
            value: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Blue),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),

            border: Style::default().fg(Color::Gray),
            selected: Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),

            year_palette: vec![
                Color::Blue,
                Color::Magenta,
                Color::Red,
                Color::Green,
                Color::DarkGray,
            ],
            workday: Style::default().fg(Color::Blue),
            holiday: Style::default().fg(Color::Magenta),
            saturday: Style::default().fg(Color::Red),
            histogram_bar: Style::default().fg(Color::Blue),
            marker_central: Style::default().fg(Color::Red),
            marker_tail: Style::default().fg(Color::Magenta),
            marker_quartile: Style::default().fg(Color::Green),
        }
    }

    /// Basic 8-colour ANSI palette without bold modifiers.
    pub fn classic() -> Self {
        Self {
            header: Style::default().fg(Color::Cyan),
            header_accent: Style::default().fg(Color::White),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),
            value: Style::default().fg(Color::White),

            info: Style::default().fg(Color::Cyan),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            border: Style::default().fg(Color::DarkGray),
            selected: Style::default().fg(Color::Black).bg(Color::White),

            year_palette: vec![Color::Cyan, Color::Magenta, Color::Yellow, Color::Green],
            workday: Style::default().fg(Color::Cyan),
            holiday: Style::default().fg(Color::Magenta),
            saturday: Style::default().fg(Color::Yellow),
            histogram_bar: Style::default().fg(Color::White),
            marker_central: Style::default().fg(Color::Red),
            marker_tail: Style::default().fg(Color::Yellow),
            marker_quartile: Style::default().fg(Color::Green),
        }
    }

    /// Choose a theme automatically based on the detected terminal background.
    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Construct a theme by name. Falls back to `auto_detect` for unknown
    /// names.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            "classic" => Self::classic(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    /// Line colour for the `index`-th year series.
    pub fn year_style(&self, index: usize) -> Style {
        match self.year_palette.len() {
            0 => self.text,
            n => Style::default().fg(self.year_palette[index % n]),
        }
    }

    pub fn day_type_style(&self, day_type: &DayType) -> Style {
        match day_type {
            DayType::Workday => self.workday,
            DayType::Holiday => self.holiday,
            DayType::Saturday => self.saturday,
            DayType::Other(_) => self.dim,
        }
    }

    pub fn marker_style(&self, kind: StatKind) -> Style {
        match kind {
            StatKind::Average | StatKind::Median => self.marker_central,
            StatKind::P5 | StatKind::P95 => self.marker_tail,
            StatKind::P25 | StatKind::P75 => self.marker_quartile,
        }
    }

    pub fn notice_style(&self, level: NoticeLevel) -> Style {
        match level {
            NoticeLevel::Info => self.info,
            NoticeLevel::Success => self.success,
            NoticeLevel::Error => self.error,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
