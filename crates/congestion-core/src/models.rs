use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Classification of a calendar day.
///
/// Only the first three variants take part in the hourly profile; any other
/// label found in the data is preserved verbatim in [`DayType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DayType {
    Workday,
    Holiday,
    Saturday,
    Other(String),
}

impl DayType {
    /// The recognized day types, in hourly-profile order.
    pub const RECOGNIZED: [DayType; 3] = [DayType::Workday, DayType::Holiday, DayType::Saturday];

    /// Classify a raw day-type label.
    ///
    /// Accepts the English names and the Spanish labels used by the source
    /// datasets (`Hábil`, `Festivo`, `Sábado`), with or without accents and
    /// in any case.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_lowercase().as_str() {
            "workday" | "hábil" | "habil" => DayType::Workday,
            "holiday" | "festivo" => DayType::Holiday,
            "saturday" | "sábado" | "sabado" => DayType::Saturday,
            _ => DayType::Other(trimmed.to_string()),
        }
    }

    /// Display label.
    pub fn label(&self) -> &str {
        match self {
            DayType::Workday => "Workday",
            DayType::Holiday => "Holiday",
            DayType::Saturday => "Saturday",
            DayType::Other(s) => s,
        }
    }

    /// Whether this day type is aggregated into the hourly profile.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, DayType::Other(_))
    }

    /// Position in [`DayType::RECOGNIZED`], or `None` for [`DayType::Other`].
    pub fn profile_index(&self) -> Option<usize> {
        match self {
            DayType::Workday => Some(0),
            DayType::Holiday => Some(1),
            DayType::Saturday => Some(2),
            DayType::Other(_) => None,
        }
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One validated congestion observation for a lane and time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Raw date text, compared lexically by the date-range filters.
    pub date: String,
    /// Date parsed once at ingestion, `None` when `date` is malformed.
    pub parsed_date: Option<NaiveDate>,
    /// Time of day, `"HH:MM"`.
    pub hour: String,
    /// ISO week number, `None` when the field is not an integer.
    pub iso_week: Option<u32>,
    pub day_name: String,
    /// Month label as written in the source (locale dependent).
    pub month: String,
    pub day_type: DayType,
    pub lane_id: String,
    pub direction: String,
    pub from_point: String,
    pub to_point: String,
    /// Congestion severity; always finite.
    pub congestion: f64,
}

impl Record {
    /// Calendar year of the parsed date.
    pub fn year(&self) -> Option<i32> {
        self.parsed_date.map(|d| d.year())
    }
}

// ── Filter fields ─────────────────────────────────────────────────────────────

/// The ten user-selectable filter fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    Year,
    DateFrom,
    DateTo,
    DayName,
    DayType,
    LaneId,
    FromPoint,
    ToPoint,
    Direction,
    HourPrefix,
}

impl FilterField {
    /// All fields, in panel order.
    pub const ALL: [FilterField; 10] = [
        FilterField::Year,
        FilterField::DateFrom,
        FilterField::DateTo,
        FilterField::DayName,
        FilterField::DayType,
        FilterField::LaneId,
        FilterField::FromPoint,
        FilterField::ToPoint,
        FilterField::Direction,
        FilterField::HourPrefix,
    ];

    /// Human-readable field name.
    pub fn label(self) -> &'static str {
        match self {
            FilterField::Year => "Year",
            FilterField::DateFrom => "Date from",
            FilterField::DateTo => "Date to",
            FilterField::DayName => "Day",
            FilterField::DayType => "Day type",
            FilterField::LaneId => "Lane",
            FilterField::FromPoint => "From",
            FilterField::ToPoint => "To",
            FilterField::Direction => "Direction",
            FilterField::HourPrefix => "Hour",
        }
    }
}

/// Read access to the current value of every filter field.
///
/// `None` (or a blank string) means the field is unset and matches all
/// records.
pub trait FilterSource {
    fn value(&self, field: FilterField) -> Option<String>;
}

// ── FilterSelection ───────────────────────────────────────────────────────────

/// Raw, untyped filter values as chosen by the user.
///
/// This is the in-memory [`FilterSource`] behind the terminal filter panel
/// and the shape persisted in the last-used settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lane_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_point: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_point: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour_prefix: Option<String>,
}

impl FilterSelection {
    fn slot(&self, field: FilterField) -> &Option<String> {
        match field {
            FilterField::Year => &self.year,
            FilterField::DateFrom => &self.date_from,
            FilterField::DateTo => &self.date_to,
            FilterField::DayName => &self.day_name,
            FilterField::DayType => &self.day_type,
            FilterField::LaneId => &self.lane_id,
            FilterField::FromPoint => &self.from_point,
            FilterField::ToPoint => &self.to_point,
            FilterField::Direction => &self.direction,
            FilterField::HourPrefix => &self.hour_prefix,
        }
    }

    fn slot_mut(&mut self, field: FilterField) -> &mut Option<String> {
        match field {
            FilterField::Year => &mut self.year,
            FilterField::DateFrom => &mut self.date_from,
            FilterField::DateTo => &mut self.date_to,
            FilterField::DayName => &mut self.day_name,
            FilterField::DayType => &mut self.day_type,
            FilterField::LaneId => &mut self.lane_id,
            FilterField::FromPoint => &mut self.from_point,
            FilterField::ToPoint => &mut self.to_point,
            FilterField::Direction => &mut self.direction,
            FilterField::HourPrefix => &mut self.hour_prefix,
        }
    }

    /// Current value of `field`, `None` when unset or blank.
    pub fn get(&self, field: FilterField) -> Option<&str> {
        self.slot(field)
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// Set `field`; a blank value clears it.
    pub fn set(&mut self, field: FilterField, value: Option<String>) {
        *self.slot_mut(field) = value.filter(|v| !v.trim().is_empty());
    }

    /// Unset every field.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        FilterField::ALL.iter().all(|f| self.get(*f).is_none())
    }
}

impl FilterSource for FilterSelection {
    fn value(&self, field: FilterField) -> Option<String> {
        self.get(field).map(str::to_string)
    }
}

// ── FilterCriteria ────────────────────────────────────────────────────────────

/// Typed filter predicates; every `None` matches all records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Calendar year, compared against the textual form of the record year.
    pub year: Option<String>,
    /// Inclusive lower bound on the raw date text.
    pub date_from: Option<String>,
    /// Inclusive upper bound on the raw date text.
    pub date_to: Option<String>,
    pub day_name: Option<String>,
    pub day_type: Option<DayType>,
    pub lane_id: Option<String>,
    pub from_point: Option<String>,
    pub to_point: Option<String>,
    pub direction: Option<String>,
    /// Two-digit hour; matches hours starting with `"<prefix>:"`.
    pub hour_prefix: Option<String>,
}

impl FilterCriteria {
    /// Read every field from `source`, treating blank values as unset.
    pub fn from_source(source: &impl FilterSource) -> Self {
        let get = |field: FilterField| {
            source
                .value(field)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            year: get(FilterField::Year),
            date_from: get(FilterField::DateFrom),
            date_to: get(FilterField::DateTo),
            day_name: get(FilterField::DayName),
            day_type: get(FilterField::DayType).map(|v| DayType::parse(&v)),
            lane_id: get(FilterField::LaneId),
            from_point: get(FilterField::FromPoint),
            to_point: get(FilterField::ToPoint),
            direction: get(FilterField::Direction),
            hour_prefix: get(FilterField::HourPrefix),
        }
    }

    /// Whether no predicate is active.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_type_parse_english() {
        assert_eq!(DayType::parse("Workday"), DayType::Workday);
        assert_eq!(DayType::parse("holiday"), DayType::Holiday);
        assert_eq!(DayType::parse("SATURDAY"), DayType::Saturday);
    }

    #[test]
    fn test_day_type_parse_source_labels() {
        assert_eq!(DayType::parse("Hábil"), DayType::Workday);
        assert_eq!(DayType::parse("Habil"), DayType::Workday);
        assert_eq!(DayType::parse("Festivo"), DayType::Holiday);
        assert_eq!(DayType::parse("Sábado"), DayType::Saturday);
    }

    #[test]
    fn test_day_type_other_is_kept_verbatim() {
        let other = DayType::parse(" Domingo ");
        assert_eq!(other, DayType::Other("Domingo".to_string()));
        assert_eq!(other.label(), "Domingo");
        assert!(!other.is_recognized());
        assert_eq!(other.profile_index(), None);
    }

    #[test]
    fn test_day_type_profile_index_matches_recognized_order() {
        for (i, dt) in DayType::RECOGNIZED.iter().enumerate() {
            assert_eq!(dt.profile_index(), Some(i));
        }
    }

    #[test]
    fn test_record_year_from_parsed_date() {
        let record = Record {
            date: "2025-01-15".to_string(),
            parsed_date: NaiveDate::from_ymd_opt(2025, 1, 15),
            hour: "08:15".to_string(),
            iso_week: Some(3),
            day_name: "Wednesday".to_string(),
            month: "January".to_string(),
            day_type: DayType::Workday,
            lane_id: "L1".to_string(),
            direction: "N".to_string(),
            from_point: "A".to_string(),
            to_point: "B".to_string(),
            congestion: 10.0,
        };
        assert_eq!(record.year(), Some(2025));

        let broken = Record {
            parsed_date: None,
            ..record
        };
        assert_eq!(broken.year(), None);
    }

    #[test]
    fn test_filter_selection_blank_values_are_unset() {
        let mut sel = FilterSelection::default();
        sel.set(FilterField::LaneId, Some("   ".to_string()));
        assert!(sel.get(FilterField::LaneId).is_none());
        assert!(sel.is_empty());

        sel.set(FilterField::LaneId, Some("L2".to_string()));
        assert_eq!(sel.get(FilterField::LaneId), Some("L2"));
        assert!(!sel.is_empty());

        sel.clear();
        assert!(sel.is_empty());
    }

    #[test]
    fn test_filter_selection_serde_skips_unset_fields() {
        let mut sel = FilterSelection::default();
        sel.set(FilterField::HourPrefix, Some("08".to_string()));
        let json = serde_json::to_string(&sel).unwrap();
        assert_eq!(json, r#"{"hour_prefix":"08"}"#);

        let back: FilterSelection = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sel);
    }

    #[test]
    fn test_criteria_from_source_types_day_type() {
        let mut sel = FilterSelection::default();
        sel.set(FilterField::DayType, Some("Hábil".to_string()));
        sel.set(FilterField::Year, Some(" 2025 ".to_string()));

        let criteria = FilterCriteria::from_source(&sel);
        assert_eq!(criteria.day_type, Some(DayType::Workday));
        assert_eq!(criteria.year.as_deref(), Some("2025"));
        assert!(criteria.lane_id.is_none());
        assert!(!criteria.is_empty());
    }

    #[test]
    fn test_criteria_from_empty_source_is_empty() {
        let criteria = FilterCriteria::from_source(&FilterSelection::default());
        assert!(criteria.is_empty());
    }

    #[test]
    fn test_filter_field_all_has_unique_labels() {
        let labels: std::collections::HashSet<&str> =
            FilterField::ALL.iter().map(|f| f.label()).collect();
        assert_eq!(labels.len(), FilterField::ALL.len());
    }
}
