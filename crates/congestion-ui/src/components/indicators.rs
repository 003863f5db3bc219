use crate::themes::Theme;
use chrono::{DateTime, Utc};
use congestion_core::notifications::{Notice, NoticeLevel};
use congestion_runtime::dashboard::DashboardState;
use ratatui::text::{Line, Span};

// ── StateIndicator ───────────────────────────────────────────────────────────

/// Dashboard lifecycle state as a coloured dot and word.
///
/// | State          | Symbol | Style   |
/// |----------------|--------|---------|
/// | Uninitialized  | ○      | dim     |
/// | Loading        | ◌      | warning |
/// | Recomputing    | ◌      | warning |
/// | Ready          | ●      | success |
pub struct StateIndicator<'a> {
    pub state: DashboardState,
    pub theme: &'a Theme,
}

impl<'a> StateIndicator<'a> {
    pub fn new(state: DashboardState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn symbol(&self) -> &'static str {
        match self.state {
            DashboardState::Uninitialized => "○",
            DashboardState::Loading | DashboardState::Recomputing => "◌",
            DashboardState::Ready => "●",
        }
    }

    pub fn word(&self) -> &'static str {
        match self.state {
            DashboardState::Uninitialized => "Starting",
            DashboardState::Loading => "Loading",
            DashboardState::Recomputing => "Updating",
            DashboardState::Ready => "Ready",
        }
    }

    /// Format: `"● Ready"`
    pub fn to_line(&self) -> Line<'a> {
        let style = match self.state {
            DashboardState::Uninitialized => self.theme.dim,
            DashboardState::Loading | DashboardState::Recomputing => self.theme.warning,
            DashboardState::Ready => self.theme.success,
        };
        Line::from(vec![
            Span::styled(self.symbol(), style),
            Span::raw(" "),
            Span::styled(self.word(), style),
        ])
    }
}

// ── NoticeIndicator ──────────────────────────────────────────────────────────

/// The most recent notice still on screen at `now`, if any.
pub struct NoticeIndicator<'a> {
    pub notice: Option<&'a Notice>,
    pub theme: &'a Theme,
}

impl<'a> NoticeIndicator<'a> {
    /// Pick the newest notice in `notices` that is visible at `now`.
    pub fn latest_visible(notices: &'a [Notice], now: DateTime<Utc>, theme: &'a Theme) -> Self {
        let notice = notices
            .iter()
            .filter(|n| n.is_visible_at(now))
            .max_by_key(|n| n.created_at);
        Self { notice, theme }
    }

    fn prefix(level: NoticeLevel) -> &'static str {
        match level {
            NoticeLevel::Info => "ℹ ",
            NoticeLevel::Success => "✔ ",
            NoticeLevel::Error => "✖ ",
        }
    }

    /// An empty line when nothing is visible.
    pub fn to_line(&self) -> Line<'a> {
        match self.notice {
            Some(notice) => {
                let style = self.theme.notice_style(notice.level);
                Line::from(vec![
                    Span::styled(Self::prefix(notice.level), style),
                    Span::styled(notice.message.clone(), style),
                ])
            }
            None => Line::from(""),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
