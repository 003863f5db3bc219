//! The dashboard controller.
//!
//! [`Dashboard`] owns the canonical record set, the latest derived views and
//! the filter options. It is the only stateful piece of the pipeline; the
//! parser, filter and aggregator it drives are pure functions.
//!
//! Nothing here returns an error: load failures become notices and the
//! previous record set (or an empty one) stays in place.

use congestion_core::models::{FilterCriteria, FilterField, FilterSource, Record};
use congestion_core::notifications::{Notice, Notifier};
use congestion_data::aggregator::{Histogram, HourlyProfile, MonthlySeries};
use congestion_data::analysis::{recompute, DerivedViews};
use congestion_data::filter::FilterOptions;
use serde::Serialize;

use crate::data_manager::{load_with_fallback, DataSource, LoadOutcome};

// ── Collaborators ─────────────────────────────────────────────────────────────

/// Receives every derived view after each recompute.
pub trait PresentationSink {
    fn show_monthly(&mut self, monthly: &MonthlySeries);
    fn show_hourly(&mut self, hourly: &HourlyProfile);
    /// `None` when no record matched the filters.
    fn show_histogram(&mut self, histogram: Option<&Histogram>);
    fn show_options(&mut self, options: &FilterOptions);
    fn show_counts(&mut self, _matched: usize, _total: usize) {}
}

// ── DashboardState ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DashboardState {
    Uninitialized,
    Loading,
    Ready,
    Recomputing,
}

// ── Dashboard ─────────────────────────────────────────────────────────────────

pub struct Dashboard {
    primary: String,
    fallback: String,
    state: DashboardState,
    records: Vec<Record>,
    views: DerivedViews,
    options: FilterOptions,
    /// Lane the current options were derived for.
    options_lane: Option<String>,
}

impl Dashboard {
    /// A dashboard that will load `primary`, falling back to `fallback`.
    pub fn new(primary: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            fallback: fallback.into(),
            state: DashboardState::Uninitialized,
            records: Vec::new(),
            views: DerivedViews::empty(0),
            options: FilterOptions::from_records(&[], None),
            options_lane: None,
        }
    }

    pub fn state(&self) -> DashboardState {
        self.state
    }

    /// The canonical record set.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn views(&self) -> &DerivedViews {
        &self.views
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    // ── Loading ───────────────────────────────────────────────────────────

    /// Enter `Loading`. Returns `false`, leaving state untouched, when a load
    /// is already outstanding.
    pub fn begin_load(&mut self, notifier: &mut impl Notifier) -> bool {
        if self.state == DashboardState::Loading {
            tracing::warn!("reload requested while a load is in progress; ignoring");
            notifier.notify(Notice::info("Data is still loading, please wait"));
            return false;
        }
        self.state = DashboardState::Loading;
        true
    }

    /// Apply a finished load, then recompute and present every view.
    pub fn finish_load(
        &mut self,
        outcome: LoadOutcome,
        filters: &impl FilterSource,
        sink: &mut impl PresentationSink,
        notifier: &mut impl Notifier,
    ) {
        match outcome {
            LoadOutcome::PrimaryOk { records, rejected } => {
                notifier.notify(Notice::success(loaded_message(records.len(), rejected)));
                self.records = records;
            }
            LoadOutcome::FallbackOk {
                records,
                rejected,
                primary_error,
            } => {
                tracing::warn!(error = %primary_error, "using sample dataset");
                let mut message = format!(
                    "Sample data loaded ({} records). Use the filters to explore the charts.",
                    records.len()
                );
                if rejected > 0 {
                    message.push_str(&format!(" {rejected} malformed lines skipped."));
                }
                notifier.notify(Notice::success(message));
                self.records = records;
            }
            LoadOutcome::BothFailed {
                primary_error,
                fallback_error,
            } => {
                tracing::error!(
                    primary = %primary_error,
                    fallback = %fallback_error,
                    kept_records = self.records.len(),
                    "no dataset could be loaded"
                );
                notifier.notify(Notice::error(format!(
                    "Could not load data. {primary_error}. {fallback_error}."
                )));
            }
        }

        self.state = DashboardState::Ready;
        self.refresh_options(filters.value(FilterField::LaneId));
        self.recompute(filters, sink);
    }

    /// Load synchronously from `source`. Ignored while a load is outstanding.
    pub fn load(
        &mut self,
        source: &dyn DataSource,
        filters: &impl FilterSource,
        sink: &mut impl PresentationSink,
        notifier: &mut impl Notifier,
    ) {
        if !self.begin_load(notifier) {
            return;
        }
        let outcome = load_with_fallback(source, &self.primary, &self.fallback);
        self.finish_load(outcome, filters, sink, notifier);
    }

    // ── Recompute ─────────────────────────────────────────────────────────

    /// Re-read the filters, re-filter, re-aggregate and push to `sink`.
    ///
    /// Skipped before the first load and while a load is outstanding.
    pub fn recompute(&mut self, filters: &impl FilterSource, sink: &mut impl PresentationSink) {
        match self.state {
            DashboardState::Uninitialized | DashboardState::Loading => {
                tracing::debug!(state = ?self.state, "recompute skipped");
                return;
            }
            DashboardState::Ready | DashboardState::Recomputing => {}
        }
        self.state = DashboardState::Recomputing;

        let lane = filters.value(FilterField::LaneId);
        if lane != self.options_lane {
            self.refresh_options(lane);
        }

        let criteria = FilterCriteria::from_source(filters);
        self.views = recompute(&self.records, &criteria);

        sink.show_options(&self.options);
        sink.show_monthly(&self.views.monthly);
        sink.show_hourly(&self.views.hourly);
        sink.show_histogram(self.views.histogram.as_ref());
        sink.show_counts(self.views.matched_records, self.views.total_records);

        self.state = DashboardState::Ready;
    }

    fn refresh_options(&mut self, lane: Option<String>) {
        self.options = FilterOptions::from_records(&self.records, lane.as_deref());
        tracing::debug!(lane = ?lane, lanes = self.options.lanes.len(), "filter options refreshed");
        self.options_lane = lane;
    }
}

fn loaded_message(count: usize, rejected: usize) -> String {
    if rejected == 0 {
        format!("Loaded {count} records")
    } else {
        format!("Loaded {count} records ({rejected} malformed lines skipped)")
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
