//! Main application state and TUI event loop for the congestion dashboard.
//!
//! [`App`] owns the theme, the filter panel and the last snapshot received
//! from the orchestrator. Key presses become [`DashboardCommand`]s; snapshots
//! arrive on an `mpsc` channel and are drained between frames.

use std::io;
use std::time::Duration;

use chrono::Utc;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use tokio::sync::mpsc;

use congestion_core::models::FilterSelection;
use congestion_runtime::dashboard::DashboardState;
use congestion_runtime::orchestrator::{DashboardCommand, DashboardHandle, DashboardUpdate};

use crate::components::filter_panel::{FilterPanel, Step};
use crate::dashboard_view;
use crate::themes::Theme;

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the dashboard TUI.
pub struct App {
    pub theme: Theme,
    /// Dataset name shown in the header.
    pub source: String,
    pub panel: FilterPanel,
    /// Most recent snapshot, `None` until the first one arrives.
    pub last_update: Option<DashboardUpdate>,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
}

impl App {
    pub fn new(theme_name: &str, source: impl Into<String>, selection: FilterSelection) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            source: source.into(),
            panel: FilterPanel::new(selection),
            last_update: None,
            should_quit: false,
        }
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the dashboard until `q`, `Q`, `Esc` or `Ctrl+C`, or until the
    /// orchestrator goes away.
    ///
    /// Uses `crossterm::event::poll` (synchronous, 250 ms timeout) so the
    /// terminal loop stays on the current thread while snapshots arrive on
    /// the async channel via `try_recv`.
    ///
    /// Returns the filter selection in effect when the loop ended.
    pub async fn run(
        mut self,
        mut rx: mpsc::Receiver<DashboardUpdate>,
        handle: DashboardHandle,
    ) -> io::Result<FilterSelection> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) => {
                        if let Some(command) = self.handle_key(key) {
                            handle.try_send(command);
                        }
                    }
                    Ok(_) => {}
                    Err(e) => break Err(e),
                },
                Ok(false) => {}
                Err(e) => break Err(e),
            }

            self.drain_updates(&mut rx);

            if self.should_quit {
                break Ok(());
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        drop(rx);
        handle.join().await;

        result.map(|()| self.panel.selection)
    }

    /// Apply every snapshot waiting in `rx` without blocking.
    pub fn drain_updates(&mut self, rx: &mut mpsc::Receiver<DashboardUpdate>) {
        loop {
            match rx.try_recv() {
                Ok(update) => self.apply_update(update),
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    tracing::debug!("orchestrator closed the update channel");
                    self.should_quit = true;
                    break;
                }
            }
        }
    }

    pub fn apply_update(&mut self, update: DashboardUpdate) {
        tracing::debug!(
            state = ?update.state,
            matched = update.matched_records,
            total = update.total_records,
            "dashboard snapshot"
        );
        self.last_update = Some(update);
    }

    /// Translate a key press into local state changes and, where the
    /// orchestrator must act, a command.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<DashboardCommand> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => self.quit(),
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.quit(),
            KeyCode::Up | KeyCode::Char('k') => {
                self.panel.select_previous();
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.panel.select_next();
                None
            }
            KeyCode::Left | KeyCode::Char('h') => self.cycle(Step::Previous),
            KeyCode::Right | KeyCode::Char('l') => self.cycle(Step::Next),
            KeyCode::Backspace | KeyCode::Delete => self
                .panel
                .clear_selected()
                .then(|| self.set_filters()),
            KeyCode::Char('c') | KeyCode::Char('C') => {
                self.panel.selection.clear();
                Some(DashboardCommand::ResetFilters)
            }
            KeyCode::Char('r') | KeyCode::Char('R') => Some(DashboardCommand::Reload),
            _ => None,
        }
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn quit(&mut self) -> Option<DashboardCommand> {
        self.should_quit = true;
        Some(DashboardCommand::Shutdown)
    }

    fn cycle(&mut self, step: Step) -> Option<DashboardCommand> {
        let options = self
            .last_update
            .as_ref()
            .map(|u| u.options.clone())
            .unwrap_or_default();
        self.panel
            .cycle(&options, step)
            .then(|| self.set_filters())
    }

    fn set_filters(&self) -> DashboardCommand {
        DashboardCommand::SetFilters(self.panel.selection.clone())
    }

    /// Render the current application state into `frame`.
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        match &self.last_update {
            Some(update) if update.state != DashboardState::Loading || update.total_records > 0 => {
                dashboard_view::render_dashboard(
                    frame,
                    area,
                    update,
                    &self.panel,
                    &self.source,
                    Utc::now(),
                    &self.theme,
                );
            }
            Some(update) => dashboard_view::render_loading(frame, area, update.state, &self.theme),
            None => dashboard_view::render_loading(
                frame,
                area,
                DashboardState::Uninitialized,
                &self.theme,
            ),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use congestion_core::models::FilterField;
    use congestion_data::filter::FilterOptions;
    use ratatui::backend::TestBackend;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with_options() -> App {
        let mut app = App::new("dark", "congestion.csv", FilterSelection::default());
        app.apply_update(DashboardUpdate {
            state: DashboardState::Ready,
            total_records: 3,
            matched_records: 3,
            options: FilterOptions {
                years: vec!["2025".into()],
                lanes: vec!["L1".into(), "L2".into()],
                ..Default::default()
            },
            ..Default::default()
        });
        app
    }

    // ── App::new ──────────────────────────────────────────────────────────────

    #[test]
    fn test_app_creation_defaults() {
        let app = App::new("dark", "congestion.csv", FilterSelection::default());
        assert_eq!(app.source, "congestion.csv");
        assert!(!app.should_quit);
        assert!(app.last_update.is_none());
        assert!(app.panel.selection.is_empty());
    }

    #[test]
    fn test_app_creation_keeps_initial_selection() {
        let mut selection = FilterSelection::default();
        selection.set(FilterField::Direction, Some("N".into()));
        let app = App::new("neon", "x.csv", selection.clone());
        assert_eq!(app.panel.selection, selection);
    }

    // ── handle_key ────────────────────────────────────────────────────────────

    #[test]
    fn test_quit_keys_send_shutdown() {
        for code in [KeyCode::Char('q'), KeyCode::Char('Q'), KeyCode::Esc] {
            let mut app = app_with_options();
            assert_eq!(app.handle_key(key(code)), Some(DashboardCommand::Shutdown));
            assert!(app.should_quit);
        }

        let mut app = app_with_options();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(app.handle_key(ctrl_c), Some(DashboardCommand::Shutdown));
        assert!(app.should_quit);
    }

    #[test]
    fn test_reload_and_reset_keys() {
        let mut app = app_with_options();
        assert_eq!(app.handle_key(key(KeyCode::Char('r'))), Some(DashboardCommand::Reload));

        app.panel.selection.set(FilterField::Year, Some("2025".into()));
        assert_eq!(
            app.handle_key(key(KeyCode::Char('c'))),
            Some(DashboardCommand::ResetFilters)
        );
        assert!(app.panel.selection.is_empty());
        assert!(!app.should_quit);
    }

    #[test]
    fn test_right_arrow_sets_filter() {
        let mut app = app_with_options();
        let command = app.handle_key(key(KeyCode::Right));

        let mut expected = FilterSelection::default();
        expected.set(FilterField::Year, Some("2025".into()));
        assert_eq!(command, Some(DashboardCommand::SetFilters(expected)));
    }

    #[test]
    fn test_navigate_to_lane_and_cycle_back() {
        let mut app = app_with_options();
        while app.panel.selected_field() != FilterField::LaneId {
            assert_eq!(app.handle_key(key(KeyCode::Down)), None);
        }

        let command = app.handle_key(key(KeyCode::Left));
        match command {
            Some(DashboardCommand::SetFilters(selection)) => {
                assert_eq!(selection.lane_id.as_deref(), Some("L2"));
            }
            other => panic!("expected SetFilters, got {other:?}"),
        }
    }

    #[test]
    fn test_cycle_without_options_sends_nothing() {
        let mut app = App::new("dark", "x.csv", FilterSelection::default());
        assert_eq!(app.handle_key(key(KeyCode::Right)), None);
    }

    #[test]
    fn test_delete_clears_only_when_set() {
        let mut app = app_with_options();
        assert_eq!(app.handle_key(key(KeyCode::Delete)), None);

        app.handle_key(key(KeyCode::Right));
        assert_eq!(
            app.handle_key(key(KeyCode::Backspace)),
            Some(DashboardCommand::SetFilters(FilterSelection::default()))
        );
    }

    #[test]
    fn test_key_release_ignored() {
        let mut app = app_with_options();
        let mut release = key(KeyCode::Char('q'));
        release.kind = KeyEventKind::Release;
        assert_eq!(app.handle_key(release), None);
        assert!(!app.should_quit);
    }

    // ── drain_updates ─────────────────────────────────────────────────────────

    #[test]
    fn test_drain_updates_keeps_latest() {
        let mut app = App::new("dark", "x.csv", FilterSelection::default());
        let (tx, mut rx) = mpsc::channel(4);
        for total in [1, 2] {
            tx.try_send(DashboardUpdate {
                total_records: total,
                ..Default::default()
            })
            .unwrap();
        }

        app.drain_updates(&mut rx);
        assert_eq!(app.last_update.as_ref().unwrap().total_records, 2);
        assert!(!app.should_quit);

        drop(tx);
        app.drain_updates(&mut rx);
        assert!(app.should_quit);
    }

    // ── Render (does not panic) ───────────────────────────────────────────────

    #[test]
    fn test_render_before_first_update_does_not_panic() {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let app = App::new("dark", "x.csv", FilterSelection::default());

        terminal.draw(|frame| app.render(frame)).unwrap();
    }

    #[test]
    fn test_render_with_update_does_not_panic() {
        let backend = TestBackend::new(120, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        let app = app_with_options();

        terminal.draw(|frame| app.render(frame)).unwrap();
    }
}
