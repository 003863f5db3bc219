//! Filter evaluation and filter-option derivation.

use std::collections::BTreeSet;

use congestion_core::models::{DayType, FilterCriteria, Record};
use congestion_core::time_utils::HOUR_LABELS;
use serde::Serialize;

// ── Evaluation ────────────────────────────────────────────────────────────────

/// Whether `record` satisfies every active predicate of `criteria`.
///
/// * `year` is compared against the year of the parsed date; a record whose
///   date did not parse never matches an active year filter.
/// * `date_from` / `date_to` are inclusive lexical bounds on the raw date.
/// * `hour_prefix` matches hours starting with `"<prefix>:"`.
/// * Every other predicate is exact equality.
pub fn matches(record: &Record, criteria: &FilterCriteria) -> bool {
    if let Some(year) = &criteria.year {
        match record.year() {
            Some(y) if y.to_string() == *year => {}
            _ => return false,
        }
    }
    if let Some(from) = &criteria.date_from {
        if record.date.as_str() < from.as_str() {
            return false;
        }
    }
    if let Some(to) = &criteria.date_to {
        if record.date.as_str() > to.as_str() {
            return false;
        }
    }
    if let Some(hour) = &criteria.hour_prefix {
        if !record.hour.starts_with(&format!("{hour}:")) {
            return false;
        }
    }
    if let Some(day_type) = &criteria.day_type {
        if record.day_type != *day_type {
            return false;
        }
    }

    eq(&criteria.day_name, &record.day_name)
        && eq(&criteria.lane_id, &record.lane_id)
        && eq(&criteria.from_point, &record.from_point)
        && eq(&criteria.to_point, &record.to_point)
        && eq(&criteria.direction, &record.direction)
}

/// Return the records that pass all active filters, in input order.
pub fn apply(records: &[Record], criteria: &FilterCriteria) -> Vec<Record> {
    if criteria.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|r| matches(r, criteria))
        .cloned()
        .collect()
}

fn eq(wanted: &Option<String>, actual: &str) -> bool {
    wanted.as_deref().map_or(true, |w| w == actual)
}

// ── Options ───────────────────────────────────────────────────────────────────

/// Selectable values for every filter field, each list sorted and distinct.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub years: Vec<String>,
    pub dates: Vec<String>,
    pub day_names: Vec<String>,
    pub day_types: Vec<String>,
    pub lanes: Vec<String>,
    pub directions: Vec<String>,
    pub from_points: Vec<String>,
    pub to_points: Vec<String>,
    pub hours: Vec<String>,
}

impl FilterOptions {
    /// Derive the option lists from the canonical record set.
    ///
    /// When `selected_lane` is set, directions and segment points come only
    /// from that lane's records. Lanes always come from the full set.
    pub fn from_records(records: &[Record], selected_lane: Option<&str>) -> Self {
        let selected_lane = selected_lane.map(str::trim).filter(|l| !l.is_empty());
        let in_lane = |r: &&Record| selected_lane.map_or(true, |lane| r.lane_id == lane);

        let years: BTreeSet<i32> = records.iter().filter_map(Record::year).collect();
        let day_types: BTreeSet<&DayType> = records.iter().map(|r| &r.day_type).collect();

        Self {
            years: years.iter().map(i32::to_string).collect(),
            dates: distinct(records.iter(), |r| &r.date),
            day_names: distinct(records.iter(), |r| &r.day_name),
            day_types: day_types
                .into_iter()
                .map(|d| d.label().to_string())
                .filter(|d| !d.is_empty())
                .collect(),
            lanes: distinct(records.iter(), |r| &r.lane_id),
            directions: distinct(records.iter().filter(in_lane), |r| &r.direction),
            from_points: distinct(records.iter().filter(in_lane), |r| &r.from_point),
            to_points: distinct(records.iter().filter(in_lane), |r| &r.to_point),
            hours: HOUR_LABELS.iter().map(|h| h.to_string()).collect(),
        }
    }
}

fn distinct<'a>(
    records: impl Iterator<Item = &'a Record>,
    field: impl Fn(&'a Record) -> &'a String,
) -> Vec<String> {
    records
        .map(field)
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .cloned()
        .collect()
}

// ── Tests ──────────────────────────────────────────────────────────────────────
