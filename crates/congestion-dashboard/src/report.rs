//! Non-interactive report: load, filter and aggregate once, then emit JSON.

use chrono::{DateTime, Utc};
use serde::Serialize;

use congestion_core::models::FilterSelection;
use congestion_core::notifications::{Notice, NoticeBoard};
use congestion_data::aggregator::{Histogram, HourlyProfile, MonthlySeries, StatKind};
use congestion_data::filter::FilterOptions;
use congestion_runtime::dashboard::{Dashboard, DashboardState};
use congestion_runtime::data_manager::DataSource;
use congestion_runtime::orchestrator::DashboardUpdate;

/// Everything the dashboard would show, as one JSON document.
#[derive(Debug, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub state: DashboardState,
    pub primary: String,
    pub fallback: String,
    pub selection: FilterSelection,
    pub matched_records: usize,
    pub total_records: usize,
    pub monthly: MonthlySeries,
    pub hourly: HourlyProfile,
    pub histogram: Option<Histogram>,
    /// One histogram-aligned series per statistic, set only at its bin.
    pub marker_series: Vec<MarkerSeries>,
    pub options: FilterOptions,
    pub notices: Vec<Notice>,
}

/// A statistic drawn over the histogram as a single point.
#[derive(Debug, Serialize)]
pub struct MarkerSeries {
    pub kind: StatKind,
    pub points: Vec<Option<usize>>,
}

fn marker_series(histogram: Option<&Histogram>) -> Vec<MarkerSeries> {
    let Some(histogram) = histogram else {
        return Vec::new();
    };
    StatKind::ALL
        .iter()
        .map(|&kind| MarkerSeries {
            kind,
            points: histogram.marker_series(kind),
        })
        .collect()
}

impl Report {
    /// Whether any dataset could be loaded.
    pub fn has_data(&self) -> bool {
        self.total_records > 0
    }
}

/// Run one synchronous load and recompute through the same [`Dashboard`] the
/// interactive mode uses.
pub fn build_report(
    source: &dyn DataSource,
    primary: &str,
    fallback: &str,
    selection: FilterSelection,
) -> Report {
    let mut dashboard = Dashboard::new(primary, fallback);
    let mut board = NoticeBoard::new();
    let mut snapshot = DashboardUpdate {
        selection,
        ..Default::default()
    };

    let filters = snapshot.selection.clone();
    dashboard.load(source, &filters, &mut snapshot, &mut board);

    Report {
        generated_at: Utc::now(),
        state: dashboard.state(),
        primary: primary.to_string(),
        fallback: fallback.to_string(),
        selection: snapshot.selection,
        matched_records: snapshot.matched_records,
        total_records: snapshot.total_records,
        monthly: snapshot.monthly,
        hourly: snapshot.hourly,
        marker_series: marker_series(snapshot.histogram.as_ref()),
        histogram: snapshot.histogram,
        options: snapshot.options,
        notices: board.all().cloned().collect(),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use congestion_core::models::FilterField;
    use congestion_core::notifications::NoticeLevel;
    use congestion_runtime::data_manager::FileDataSource;
    use tempfile::TempDir;

    const DATA: &str = "\
date,hour,week,day,month,day_type,lane,direction,from,to,congestion
2025-01-15,08:15,3,Wed,Jan,Workday,L1,N,A,B,10
2025-01-15,08:45,3,Wed,Jan,Workday,L1,N,A,B,20
2025-02-01,08:00,5,Sat,Feb,Saturday,L2,S,C,D,5
";

    #[test]
    fn test_report_with_lane_filter() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(dir.path().join("congestion.csv"), DATA).expect("write");
        let source = FileDataSource::new(dir.path());

        let mut selection = FilterSelection::default();
        selection.set(FilterField::LaneId, Some("L1".into()));
        let report = build_report(&source, "congestion.csv", "sample_data.csv", selection);

        assert!(report.has_data());
        assert_eq!(report.state, DashboardState::Ready);
        assert_eq!(report.total_records, 3);
        assert_eq!(report.matched_records, 2);
        assert_eq!(report.options.directions, vec!["N"]);
        assert_eq!(report.notices[0].level, NoticeLevel::Success);
    }

    #[test]
    fn test_report_marker_series_point_at_marker_bin() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(dir.path().join("congestion.csv"), DATA).expect("write");
        let source = FileDataSource::new(dir.path());

        let report = build_report(&source, "congestion.csv", "sample_data.csv", FilterSelection::default());
        let histogram = report.histogram.as_ref().expect("histogram");

        assert_eq!(report.marker_series.len(), StatKind::ALL.len());
        for series in &report.marker_series {
            let bin = histogram.marker(series.kind).expect("marker").bin_index;
            assert_eq!(series.points.len(), histogram.counts.len());
            assert_eq!(series.points[bin], Some(histogram.counts[bin]));
            assert_eq!(series.points.iter().filter(|p| p.is_some()).count(), 1);
        }
    }

    #[test]
    fn test_report_serializes_views() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(dir.path().join("sample_data.csv"), DATA).expect("write");
        let source = FileDataSource::new(dir.path());

        let report = build_report(&source, "congestion.csv", "sample_data.csv", FilterSelection::default());
        let json = serde_json::to_value(&report).expect("serialize");

        assert_eq!(json["total_records"], 3);
        assert_eq!(json["monthly"]["years"][0]["year"], 2025);
        assert_eq!(json["hourly"]["series"].as_array().map(Vec::len), Some(3));
        assert_eq!(json["histogram"]["counts"].as_array().map(Vec::len), Some(20));
        assert_eq!(json["marker_series"].as_array().map(Vec::len), Some(6));
        assert!(json["notices"][0]["message"]
            .as_str()
            .is_some_and(|m| m.starts_with("Sample data loaded")));
    }

    #[test]
    fn test_report_without_data_has_error_notice() {
        let dir = TempDir::new().expect("tempdir");
        let source = FileDataSource::new(dir.path());

        let report = build_report(&source, "congestion.csv", "sample_data.csv", FilterSelection::default());

        assert!(!report.has_data());
        assert!(report.histogram.is_none());
        assert!(report.marker_series.is_empty());
        assert!(report.notices.iter().any(|n| n.level == NoticeLevel::Error));
    }
}
