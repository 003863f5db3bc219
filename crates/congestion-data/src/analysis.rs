//! The pure filter-then-aggregate pipeline.
//!
//! [`recompute`] is what the dashboard calls after every filter change or
//! reload. It owns no state: the same records and criteria always produce
//! the same views (apart from `generated_at`).

use std::time::Instant;

use chrono::{DateTime, Utc};
use congestion_core::models::{FilterCriteria, Record};
use serde::Serialize;
use tracing::debug;

use crate::aggregator::{Histogram, HourlyProfile, MonthlySeries};
use crate::filter::apply;

// ── Public types ──────────────────────────────────────────────────────────────

/// Every view derived from one filtered subset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedViews {
    pub monthly: MonthlySeries,
    pub hourly: HourlyProfile,
    /// `None` when no record matched.
    pub histogram: Option<Histogram>,
    /// Records that passed the filters.
    pub matched_records: usize,
    /// Size of the canonical set the filters ran over.
    pub total_records: usize,
    pub generated_at: DateTime<Utc>,
}

impl DerivedViews {
    /// Views of an empty subset.
    pub fn empty(total_records: usize) -> Self {
        Self {
            monthly: MonthlySeries::default(),
            hourly: HourlyProfile::default(),
            histogram: None,
            matched_records: 0,
            total_records,
            generated_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.matched_records == 0
    }
}

// ── Public function ───────────────────────────────────────────────────────────

/// Filter `records` by `criteria` and aggregate the result.
pub fn recompute(records: &[Record], criteria: &FilterCriteria) -> DerivedViews {
    let filter_start = Instant::now();
    let filtered = apply(records, criteria);
    let filter_time = filter_start.elapsed();

    let aggregate_start = Instant::now();
    let monthly = MonthlySeries::compute(&filtered);
    let hourly = HourlyProfile::compute(&filtered);
    let histogram = Histogram::compute(&filtered);
    let aggregate_time = aggregate_start.elapsed();

    debug!(
        total = records.len(),
        matched = filtered.len(),
        years = monthly.years.len(),
        filter_us = filter_time.as_micros() as u64,
        aggregate_us = aggregate_time.as_micros() as u64,
        "recomputed derived views"
    );

    DerivedViews {
        monthly,
        hourly,
        histogram,
        matched_records: filtered.len(),
        total_records: records.len(),
        generated_at: Utc::now(),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use congestion_core::models::{DayType, FilterField, FilterSelection};

    const TEXT: &str = "\
date,hour,week,day,month,day_type,lane,direction,from,to,congestion
2025-01-15,08:15,3,Wed,Jan,Workday,L1,N,A,B,10
2025-01-15,17:45,3,Wed,Jan,Workday,L1,N,A,B,30
2025-02-01,08:00,5,Sat,Feb,Saturday,L2,S,C,D,5
";

    fn criteria(field: FilterField, value: &str) -> FilterCriteria {
        let mut sel = FilterSelection::default();
        sel.set(field, Some(value.to_string()));
        FilterCriteria::from_source(&sel)
    }

    #[test]
    fn test_recompute_without_filters_uses_all_records() {
        let records = parse(TEXT);
        let views = recompute(&records, &FilterCriteria::default());

        assert_eq!(views.total_records, 3);
        assert_eq!(views.matched_records, 3);
        assert_eq!(views.monthly.year(2025).unwrap().values[0], 20.0);
        assert_eq!(views.histogram.as_ref().unwrap().total(), 3);
    }

    #[test]
    fn test_recompute_applies_filters_before_aggregating() {
        let records = parse(TEXT);
        let views = recompute(&records, &criteria(FilterField::LaneId, "L1"));

        assert_eq!(views.matched_records, 2);
        let workday = views.hourly.for_day_type(&DayType::Workday).unwrap();
        assert_eq!(workday.values[8], 10.0);
        assert_eq!(workday.values[17], 30.0);
        assert_eq!(views.monthly.year(2025).unwrap().values[1], 0.0);
    }

    #[test]
    fn test_recompute_no_match_yields_empty_views() {
        let records = parse(TEXT);
        let views = recompute(&records, &criteria(FilterField::Direction, "W"));

        assert!(views.is_empty());
        assert_eq!(views.total_records, 3);
        assert!(views.histogram.is_none());
        assert!(views.monthly.years.is_empty());
        assert_eq!(views.hourly.series.len(), 3);
        assert_eq!(views.hourly.max_value(), 0.0);
    }

    #[test]
    fn test_recompute_is_deterministic() {
        let records = parse(TEXT);
        let c = criteria(FilterField::HourPrefix, "08");
        let a = recompute(&records, &c);
        let b = recompute(&records, &c);

        assert_eq!(a.monthly, b.monthly);
        assert_eq!(a.hourly, b.hourly);
        assert_eq!(a.histogram, b.histogram);
    }

    #[test]
    fn test_empty_views_match_recompute_over_nothing() {
        let empty = DerivedViews::empty(0);
        let computed = recompute(&[], &FilterCriteria::default());
        assert_eq!(empty.monthly, computed.monthly);
        assert_eq!(empty.hourly, computed.hourly);
        assert_eq!(empty.histogram, computed.histogram);
    }

    #[test]
    fn test_derived_views_serialize_to_json() {
        let views = recompute(&parse(TEXT), &FilterCriteria::default());
        let json = serde_json::to_value(&views).unwrap();

        assert_eq!(json["matched_records"], 3);
        assert_eq!(json["hourly"]["series"][0]["day_type"], "Workday");
        assert_eq!(json["histogram"]["counts"].as_array().unwrap().len(), 20);
    }
}
