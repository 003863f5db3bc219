//! Async dashboard orchestrator.
//!
//! Runs a [`Dashboard`] inside a tokio task. The UI sends
//! [`DashboardCommand`]s over an `mpsc` channel; the task handles them one at
//! a time and answers each with a [`DashboardUpdate`] snapshot, so the two
//! sides never share mutable state. Commands that arrive while a load is in
//! flight simply wait in the channel.

use std::sync::Arc;

use chrono::Utc;
use congestion_core::models::FilterSelection;
use congestion_core::notifications::{Notice, NoticeBoard};
use congestion_data::aggregator::{Histogram, HourlyProfile, MonthlySeries};
use congestion_data::filter::FilterOptions;
use tokio::sync::mpsc;

use crate::dashboard::{Dashboard, DashboardState, PresentationSink};
use crate::data_manager::{load_with_fallback, DataSource, LoadOutcome};

/// Buffered commands before `send` starts to wait.
const COMMAND_BUFFER: usize = 32;
/// Buffered snapshots so a slow UI does not stall the task.
const UPDATE_BUFFER: usize = 16;

// ── Public types ──────────────────────────────────────────────────────────────

/// Requests the UI can make of the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardCommand {
    /// Reload the primary (or fallback) dataset.
    Reload,
    /// Replace the whole filter selection and recompute.
    SetFilters(FilterSelection),
    /// Clear every filter and recompute.
    ResetFilters,
    /// Stop the task.
    Shutdown,
}

/// Everything the UI needs to draw one frame.
#[derive(Debug, Clone)]
pub struct DashboardUpdate {
    pub state: DashboardState,
    pub monthly: MonthlySeries,
    pub hourly: HourlyProfile,
    pub histogram: Option<Histogram>,
    pub matched_records: usize,
    pub total_records: usize,
    pub options: FilterOptions,
    /// Notices still visible when the snapshot was taken.
    pub notices: Vec<Notice>,
    /// The filter selection the views were computed with.
    pub selection: FilterSelection,
}

impl Default for DashboardUpdate {
    fn default() -> Self {
        Self {
            state: DashboardState::Uninitialized,
            monthly: MonthlySeries::default(),
            hourly: HourlyProfile::default(),
            histogram: None,
            matched_records: 0,
            total_records: 0,
            options: FilterOptions::default(),
            notices: Vec::new(),
            selection: FilterSelection::default(),
        }
    }
}

impl PresentationSink for DashboardUpdate {
    fn show_monthly(&mut self, monthly: &MonthlySeries) {
        self.monthly = monthly.clone();
    }

    fn show_hourly(&mut self, hourly: &HourlyProfile) {
        self.hourly = hourly.clone();
    }

    fn show_histogram(&mut self, histogram: Option<&Histogram>) {
        self.histogram = histogram.cloned();
    }

    fn show_options(&mut self, options: &FilterOptions) {
        self.options = options.clone();
    }

    fn show_counts(&mut self, matched: usize, total: usize) {
        self.matched_records = matched;
        self.total_records = total;
    }
}

// ── DashboardOrchestrator ─────────────────────────────────────────────────────

/// Owns the data source and source names until [`start`](Self::start) moves
/// them into the background task.
pub struct DashboardOrchestrator {
    source: Arc<dyn DataSource + Send + Sync>,
    primary: String,
    fallback: String,
    initial_selection: FilterSelection,
}

impl DashboardOrchestrator {
    pub fn new(
        source: Arc<dyn DataSource + Send + Sync>,
        primary: impl Into<String>,
        fallback: impl Into<String>,
        initial_selection: FilterSelection,
    ) -> Self {
        Self {
            source,
            primary: primary.into(),
            fallback: fallback.into(),
            initial_selection,
        }
    }

    /// Spawn the orchestrator task. An initial load runs immediately.
    ///
    /// Returns the update receiver and a [`DashboardHandle`] for sending
    /// commands and stopping the task.
    pub fn start(self) -> (mpsc::Receiver<DashboardUpdate>, DashboardHandle) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (update_tx, update_rx) = mpsc::channel(UPDATE_BUFFER);

        let task = tokio::spawn(async move {
            self.run(command_rx, update_tx).await;
        });

        (
            update_rx,
            DashboardHandle {
                commands: command_tx,
                task,
            },
        )
    }

    // ── Private implementation ────────────────────────────────────────────

    async fn run(
        self,
        mut commands: mpsc::Receiver<DashboardCommand>,
        updates: mpsc::Sender<DashboardUpdate>,
    ) {
        let mut dashboard = Dashboard::new(self.primary.clone(), self.fallback.clone());
        let mut board = NoticeBoard::new();
        let mut snapshot = DashboardUpdate {
            selection: self.initial_selection.clone(),
            ..Default::default()
        };

        self.reload(&mut dashboard, &mut snapshot, &mut board).await;
        if !publish(&updates, &dashboard, &mut snapshot, &mut board).await {
            return;
        }

        while let Some(command) = commands.recv().await {
            tracing::debug!(?command, "dashboard command");
            match command {
                DashboardCommand::Reload => {
                    self.reload(&mut dashboard, &mut snapshot, &mut board).await;
                }
                DashboardCommand::SetFilters(selection) => {
                    snapshot.selection = selection;
                    let selection = snapshot.selection.clone();
                    dashboard.recompute(&selection, &mut snapshot);
                }
                DashboardCommand::ResetFilters => {
                    snapshot.selection.clear();
                    let selection = snapshot.selection.clone();
                    dashboard.recompute(&selection, &mut snapshot);
                }
                DashboardCommand::Shutdown => {
                    tracing::debug!("dashboard orchestrator shutting down");
                    break;
                }
            }

            if !publish(&updates, &dashboard, &mut snapshot, &mut board).await {
                break;
            }
        }
    }

    /// Fetch on the blocking pool; the dashboard stays in `Loading` meanwhile.
    async fn reload(
        &self,
        dashboard: &mut Dashboard,
        snapshot: &mut DashboardUpdate,
        board: &mut NoticeBoard,
    ) {
        if !dashboard.begin_load(board) {
            return;
        }

        let source = Arc::clone(&self.source);
        let primary = self.primary.clone();
        let fallback = self.fallback.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            load_with_fallback(&*source, &primary, &fallback)
        })
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "load task failed");
            LoadOutcome::BothFailed {
                primary_error: std::io::Error::other(e.to_string()).into(),
                fallback_error: std::io::Error::other("fallback not attempted").into(),
            }
        });

        let selection = snapshot.selection.clone();
        dashboard.finish_load(outcome, &selection, snapshot, board);
    }
}

/// Stamp state and notices onto the snapshot and send it. Returns `false`
/// once the receiver is gone.
async fn publish(
    updates: &mpsc::Sender<DashboardUpdate>,
    dashboard: &Dashboard,
    snapshot: &mut DashboardUpdate,
    board: &mut NoticeBoard,
) -> bool {
    let now = Utc::now();
    board.prune(now);
    snapshot.state = dashboard.state();
    snapshot.notices = board.visible_at(now);

    if updates.send(snapshot.clone()).await.is_err() {
        tracing::debug!("update receiver dropped; stopping orchestrator");
        return false;
    }
    true
}

// ── DashboardHandle ───────────────────────────────────────────────────────────

/// Command endpoint for the background task.
///
/// Dropping the handle closes the command channel, which ends the task once
/// queued commands are drained.
pub struct DashboardHandle {
    commands: mpsc::Sender<DashboardCommand>,
    task: tokio::task::JoinHandle<()>,
}

impl DashboardHandle {
    /// Queue a command, waiting for channel capacity.
    pub async fn send(&self, command: DashboardCommand) -> bool {
        self.commands.send(command).await.is_ok()
    }

    /// Queue a command without waiting. Returns `false` when the channel is
    /// full or closed.
    pub fn try_send(&self, command: DashboardCommand) -> bool {
        match self.commands.try_send(command) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "dropping dashboard command");
                false
            }
        }
    }

    /// Immediately abort the task.
    pub fn abort(&self) {
        self.task.abort();
    }

    /// Wait for the task to finish.
    pub async fn join(self) {
        let _ = self.task.await;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
