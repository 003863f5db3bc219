//! Aggregation of a filtered record subset into chartable views.
//!
//! Three independent views are produced: mean congestion per calendar month
//! for each observed year, mean congestion per hour of day for each
//! recognized day type, and a fixed-width value histogram annotated with
//! descriptive statistics. Empty buckets are always `0.0`, never `NaN`.

use std::collections::BTreeMap;

use chrono::Datelike;
use congestion_core::formatting::{format_bin_label, format_stat};
use congestion_core::models::{DayType, Record};
use congestion_core::stats::Summary;
use congestion_core::time_utils::{month_index, parse_hour_of_day};
use serde::Serialize;

/// Number of histogram bins.
pub const BIN_COUNT: usize = 20;
pub const MONTHS_PER_YEAR: usize = 12;
pub const HOURS_PER_DAY: usize = 24;

/// Workday, Holiday, Saturday.
const PROFILE_DAY_TYPES: usize = 3;

// ── Mean accumulator ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
struct MeanAccumulator {
    sum: f64,
    count: u32,
}

impl MeanAccumulator {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

// ── MonthlySeries ─────────────────────────────────────────────────────────────

/// Twelve monthly means for one calendar year; index 0 is January.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearSeries {
    pub year: i32,
    pub values: [f64; MONTHS_PER_YEAR],
}

/// Monthly mean congestion, one series per observed year, years ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthlySeries {
    pub years: Vec<YearSeries>,
}

impl MonthlySeries {
    /// Group by (year, month) of the parsed date. Undated records are skipped.
    pub fn compute(records: &[Record]) -> Self {
        let mut buckets: BTreeMap<i32, [MeanAccumulator; MONTHS_PER_YEAR]> = BTreeMap::new();

        for record in records {
            let Some(date) = record.parsed_date else {
                continue;
            };
            buckets.entry(date.year()).or_default()[month_index(date)].add(record.congestion);
        }

        let years = buckets
            .into_iter()
            .map(|(year, months)| YearSeries {
                year,
                values: months.map(|m| m.mean()),
            })
            .collect();
        Self { years }
    }

    /// The series for `year`, if it was observed.
    pub fn year(&self, year: i32) -> Option<&YearSeries> {
        self.years.iter().find(|s| s.year == year)
    }

    /// Largest monthly mean across all years, `0.0` when empty.
    pub fn max_value(&self) -> f64 {
        self.years
            .iter()
            .flat_map(|s| s.values.iter().copied())
            .fold(0.0, f64::max)
    }
}

// ── HourlyProfile ─────────────────────────────────────────────────────────────

/// Twenty-four hourly means for one day type; index is the hour of day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayTypeSeries {
    pub day_type: DayType,
    pub values: [f64; HOURS_PER_DAY],
}

/// Hourly mean congestion for Workday, Holiday and Saturday, in that order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyProfile {
    pub series: Vec<DayTypeSeries>,
}

impl Default for HourlyProfile {
    fn default() -> Self {
        Self::compute(&[])
    }
}

impl HourlyProfile {
    /// Only recognized day types are aggregated. Records whose hour has no
    /// leading integer in `0..=23` are skipped for this view.
    pub fn compute(records: &[Record]) -> Self {
        let mut buckets = [[MeanAccumulator::default(); HOURS_PER_DAY]; PROFILE_DAY_TYPES];

        for record in records {
            let Some(profile) = record.day_type.profile_index() else {
                continue;
            };
            let Some(hour) = parse_hour_of_day(&record.hour) else {
                continue;
            };
            buckets[profile][hour].add(record.congestion);
        }

        let series = DayType::RECOGNIZED
            .iter()
            .zip(buckets)
            .map(|(day_type, hours)| DayTypeSeries {
                day_type: day_type.clone(),
                values: hours.map(|h| h.mean()),
            })
            .collect();
        Self { series }
    }

    /// The series for a recognized `day_type`.
    pub fn for_day_type(&self, day_type: &DayType) -> Option<&DayTypeSeries> {
        self.series.iter().find(|s| &s.day_type == day_type)
    }

    /// Largest hourly mean across all day types, `0.0` when empty.
    pub fn max_value(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|s| s.values.iter().copied())
            .fold(0.0, f64::max)
    }
}

// ── Histogram ─────────────────────────────────────────────────────────────────

/// Statistics highlighted on the histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StatKind {
    Average,
    Median,
    P5,
    P25,
    P75,
    P95,
}

impl StatKind {
    pub const ALL: [StatKind; 6] = [
        StatKind::Average,
        StatKind::Median,
        StatKind::P5,
        StatKind::P25,
        StatKind::P75,
        StatKind::P95,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StatKind::Average => "Average",
            StatKind::Median => "Median",
            StatKind::P5 => "P5",
            StatKind::P25 => "P25",
            StatKind::P75 => "P75",
            StatKind::P95 => "P95",
        }
    }

    fn value_in(self, summary: &Summary) -> f64 {
        match self {
            StatKind::Average => summary.average,
            StatKind::Median => summary.median,
            StatKind::P5 => summary.p5,
            StatKind::P25 => summary.p25,
            StatKind::P75 => summary.p75,
            StatKind::P95 => summary.p95,
        }
    }
}

/// A statistic located on the histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatMarker {
    pub kind: StatKind,
    pub value: f64,
    pub bin_index: usize,
    /// e.g. `"Median: 12.3"`.
    pub label: String,
}

/// Distribution of congestion values over [`BIN_COUNT`] equal-width bins
/// spanning `[min, max]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub counts: Vec<usize>,
    pub labels: Vec<String>,
    pub min: f64,
    pub max: f64,
    pub bin_size: f64,
    pub summary: Summary,
    pub markers: Vec<StatMarker>,
}

impl Histogram {
    /// Build the histogram, or `None` when `records` is empty.
    ///
    /// When every value is equal the bin size is zero and all values land
    /// in bin 0.
    pub fn compute(records: &[Record]) -> Option<Self> {
        let values: Vec<f64> = records.iter().map(|r| r.congestion).collect();
        let summary = Summary::from_values(values.clone())?;

        let min = summary.min;
        let max = summary.max;
        let bin_size = (max - min) / BIN_COUNT as f64;

        let mut counts = vec![0usize; BIN_COUNT];
        for value in &values {
            counts[bin_index_for(*value, min, bin_size)] += 1;
        }

        let labels = (0..BIN_COUNT)
            .map(|i| {
                let start = min + i as f64 * bin_size;
                let end = min + (i + 1) as f64 * bin_size;
                format_bin_label(start, end)
            })
            .collect();

        let markers = StatKind::ALL
            .iter()
            .map(|&kind| {
                let value = kind.value_in(&summary);
                StatMarker {
                    kind,
                    value,
                    bin_index: bin_index_for(value, min, bin_size),
                    label: format_stat(kind.name(), value),
                }
            })
            .collect();

        Some(Self {
            counts,
            labels,
            min,
            max,
            bin_size,
            summary,
            markers,
        })
    }

    /// Highest bin count, used to scale the chart.
    pub fn max_frequency(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    pub fn marker(&self, kind: StatKind) -> Option<&StatMarker> {
        self.markers.iter().find(|m| m.kind == kind)
    }

    /// A [`BIN_COUNT`]-point series that is empty everywhere except at the
    /// marker's bin, where it carries that bin's count.
    pub fn marker_series(&self, kind: StatKind) -> Vec<Option<usize>> {
        let mut series = vec![None; BIN_COUNT];
        if let Some(marker) = self.marker(kind) {
            series[marker.bin_index] = Some(self.counts[marker.bin_index]);
        }
        series
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

fn bin_index_for(value: f64, min: f64, bin_size: f64) -> usize {
    if bin_size <= 0.0 {
        return 0;
    }
    // `as usize` saturates negatives to 0.
    (((value - min) / bin_size).floor() as usize).min(BIN_COUNT - 1)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(date: &str, hour: &str, day_type: DayType, congestion: f64) -> Record {
        Record {
            date: date.to_string(),
            parsed_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
            hour: hour.to_string(),
            iso_week: None,
            day_name: String::new(),
            month: String::new(),
            day_type,
            lane_id: "L1".to_string(),
            direction: "N".to_string(),
            from_point: "A".to_string(),
            to_point: "B".to_string(),
            congestion,
        }
    }

    fn values(values: &[f64]) -> Vec<Record> {
        values
            .iter()
            .map(|v| record("2025-01-01", "00:00", DayType::Workday, *v))
            .collect()
    }

    // ── MonthlySeries ────────────────────────────────────────────────────────

    #[test]
    fn test_monthly_means_and_zero_fill() {
        let records = vec![
            record("2025-01-15", "08:15", DayType::Workday, 10.0),
            record("2025-01-20", "08:45", DayType::Workday, 20.0),
            record("2025-02-01", "08:00", DayType::Saturday, 5.0),
        ];
        let monthly = MonthlySeries::compute(&records);

        assert_eq!(monthly.years.len(), 1);
        let series = monthly.year(2025).unwrap();
        assert_eq!(series.values[0], 15.0);
        assert_eq!(series.values[1], 5.0);
        assert!(series.values[2..].iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_monthly_years_ascending_and_undated_skipped() {
        let records = vec![
            record("2025-03-01", "08:00", DayType::Workday, 1.0),
            record("2023-03-01", "08:00", DayType::Workday, 2.0),
            record("not-a-date", "08:00", DayType::Workday, 100.0),
        ];
        let monthly = MonthlySeries::compute(&records);

        let years: Vec<i32> = monthly.years.iter().map(|s| s.year).collect();
        assert_eq!(years, vec![2023, 2025]);
        assert_eq!(monthly.max_value(), 2.0);
    }

    #[test]
    fn test_monthly_empty() {
        let monthly = MonthlySeries::compute(&[]);
        assert!(monthly.years.is_empty());
        assert_eq!(monthly.max_value(), 0.0);
    }

    // ── HourlyProfile ────────────────────────────────────────────────────────

    #[test]
    fn test_hourly_profile_always_has_three_series() {
        let profile = HourlyProfile::compute(&[]);
        let kinds: Vec<&DayType> = profile.series.iter().map(|s| &s.day_type).collect();
        assert_eq!(
            kinds,
            vec![&DayType::Workday, &DayType::Holiday, &DayType::Saturday]
        );
        assert!(profile
            .series
            .iter()
            .all(|s| s.values.iter().all(|v| *v == 0.0)));
    }

    #[test]
    fn test_hourly_profile_means_by_day_type() {
        let records = vec![
            record("2025-01-15", "08:15", DayType::Workday, 10.0),
            record("2025-01-15", "08:45", DayType::Workday, 20.0),
            record("2025-02-01", "08:00", DayType::Saturday, 5.0),
        ];
        let profile = HourlyProfile::compute(&records);

        assert_eq!(profile.for_day_type(&DayType::Workday).unwrap().values[8], 15.0);
        assert_eq!(profile.for_day_type(&DayType::Saturday).unwrap().values[8], 5.0);
        assert_eq!(profile.for_day_type(&DayType::Holiday).unwrap().values[8], 0.0);
    }

    #[test]
    fn test_hourly_profile_skips_other_day_types_and_bad_hours() {
        let records = vec![
            record("2025-01-15", "08:00", DayType::Other("Domingo".into()), 99.0),
            record("2025-01-15", "24:00", DayType::Workday, 99.0),
            record("2025-01-15", "late", DayType::Workday, 99.0),
            record("2025-01-15", "23:30", DayType::Holiday, 4.0),
        ];
        let profile = HourlyProfile::compute(&records);

        assert_eq!(profile.max_value(), 4.0);
        assert_eq!(profile.for_day_type(&DayType::Holiday).unwrap().values[23], 4.0);
    }

    // ── Histogram ────────────────────────────────────────────────────────────

    #[test]
    fn test_histogram_empty_is_none() {
        assert!(Histogram::compute(&[]).is_none());
    }

    #[test]
    fn test_histogram_counts_sum_to_subset_size() {
        let data: Vec<f64> = (0..137).map(|i| ((i * 37) % 101) as f64 / 3.0).collect();
        let hist = Histogram::compute(&values(&data)).unwrap();

        assert_eq!(hist.counts.len(), BIN_COUNT);
        assert_eq!(hist.labels.len(), BIN_COUNT);
        assert_eq!(hist.total(), data.len());
    }

    #[test]
    fn test_histogram_max_value_lands_in_last_bin() {
        let hist = Histogram::compute(&values(&[0.0, 50.0, 100.0])).unwrap();
        assert_eq!(hist.bin_size, 5.0);
        assert_eq!(hist.counts[0], 1);
        assert_eq!(hist.counts[10], 1);
        assert_eq!(hist.counts[19], 1);
        assert_eq!(hist.labels[0], "0-5");
        assert_eq!(hist.labels[19], "95-100");
    }

    #[test]
    fn test_histogram_bin_end_measured_from_min() {
        // bin_size = 0.15; the end of bin 9 is exactly 1.5 and rounds up.
        let hist = Histogram::compute(&values(&[0.0, 3.0])).unwrap();
        assert_eq!(hist.labels[9], "1-2");
        assert_eq!(hist.labels[10], "2-2");
    }

    #[test]
    fn test_histogram_all_equal_values_go_to_first_bin() {
        let hist = Histogram::compute(&values(&[7.0, 7.0, 7.0, 7.0])).unwrap();
        assert_eq!(hist.bin_size, 0.0);
        assert_eq!(hist.counts[0], 4);
        assert_eq!(hist.total(), 4);
        assert!(hist.markers.iter().all(|m| m.bin_index == 0));
        assert_eq!(hist.labels[0], "7-7");
    }

    #[test]
    fn test_histogram_markers() {
        let hist = Histogram::compute(&values(&[0.0, 10.0, 20.0, 30.0, 100.0])).unwrap();

        let median = hist.marker(StatKind::Median).unwrap();
        assert_eq!(median.value, 20.0);
        assert_eq!(median.bin_index, 4);
        assert_eq!(median.label, "Median: 20.0");

        let average = hist.marker(StatKind::Average).unwrap();
        assert_eq!(average.value, 32.0);
        assert_eq!(average.bin_index, 6);
        assert_eq!(hist.markers.len(), StatKind::ALL.len());
    }

    #[test]
    fn test_histogram_marker_series_uses_bin_count() {
        let hist = Histogram::compute(&values(&[0.0, 1.0, 1.0, 2.0, 100.0])).unwrap();
        let series = hist.marker_series(StatKind::Median);

        assert_eq!(series.len(), BIN_COUNT);
        assert_eq!(series[0], Some(4));
        assert_eq!(series.iter().filter(|p| p.is_some()).count(), 1);
        assert_eq!(hist.max_frequency(), 4);
    }

    #[test]
    fn test_histogram_single_record() {
        let hist = Histogram::compute(&values(&[12.5])).unwrap();
        assert_eq!(hist.counts[0], 1);
        assert_eq!(hist.summary.median, 12.5);
        assert_eq!(hist.summary.p95, 12.5);
    }
}
