//! Comma-delimited record parsing.
//!
//! Turns the raw text of a congestion dataset into typed [`Record`]s. Lines
//! are validated one at a time: a bad line is logged and skipped, never
//! fatal. Quoted fields are not supported; a comma inside a value splits it.

use congestion_core::models::{DayType, Record};
use congestion_core::time_utils::parse_record_date;
use tracing::{debug, warn};

/// Minimum number of comma-separated fields a data line must carry.
pub const MIN_FIELDS: usize = 11;

// ── Field positions ───────────────────────────────────────────────────────────

const DATE: usize = 0;
const HOUR: usize = 1;
const ISO_WEEK: usize = 2;
const DAY_NAME: usize = 3;
const MONTH: usize = 4;
const DAY_TYPE: usize = 5;
const LANE_ID: usize = 6;
const DIRECTION: usize = 7;
const FROM_POINT: usize = 8;
const TO_POINT: usize = 9;
const CONGESTION: usize = 10;

// ── Report types ──────────────────────────────────────────────────────────────

/// Why a data line produced no record.
#[derive(Debug, Clone, PartialEq)]
pub enum RejectReason {
    TooFewFields { found: usize },
    InvalidCongestion { raw: String },
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::TooFewFields { found } => {
                write!(f, "expected at least {MIN_FIELDS} fields, found {found}")
            }
            RejectReason::InvalidCongestion { raw } => {
                write!(f, "congestion value {raw:?} is not a finite number")
            }
        }
    }
}

/// A rejected data line. `line_number` is 1-based and counts the header.
#[derive(Debug, Clone, PartialEq)]
pub struct LineRejection {
    pub line_number: usize,
    pub reason: RejectReason,
}

/// Outcome of [`parse_with_report`].
#[derive(Debug, Clone, Default)]
pub struct ParseReport {
    pub records: Vec<Record>,
    pub rejections: Vec<LineRejection>,
    /// Non-blank lines after the header.
    pub data_lines: usize,
    /// Accepted records whose date did not parse.
    pub undated: usize,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Parse dataset text into records, discarding malformed lines.
pub fn parse(text: &str) -> Vec<Record> {
    parse_with_report(text).records
}

/// Parse dataset text and report every rejected line.
///
/// The first line is a header and is skipped without validation. Blank lines
/// are ignored and do not count as data lines.
pub fn parse_with_report(text: &str) -> ParseReport {
    let mut report = ParseReport::default();

    for (idx, line) in text.trim().lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        report.data_lines += 1;
        let line_number = idx + 1;

        match parse_line(line) {
            Ok(record) => {
                if record.parsed_date.is_none() {
                    debug!(line = line_number, date = %record.date, "record date did not parse");
                    report.undated += 1;
                }
                report.records.push(record);
            }
            Err(reason) => {
                warn!(line = line_number, %reason, "skipping malformed line");
                report.rejections.push(LineRejection {
                    line_number,
                    reason,
                });
            }
        }
    }

    debug!(
        records = report.records.len(),
        rejected = report.rejections.len(),
        data_lines = report.data_lines,
        "parsed dataset"
    );
    report
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn parse_line(line: &str) -> Result<Record, RejectReason> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < MIN_FIELDS {
        return Err(RejectReason::TooFewFields {
            found: fields.len(),
        });
    }

    let congestion = parse_congestion(fields[CONGESTION]).ok_or_else(|| {
        RejectReason::InvalidCongestion {
            raw: fields[CONGESTION].to_string(),
        }
    })?;

    Ok(Record {
        date: fields[DATE].to_string(),
        parsed_date: parse_record_date(fields[DATE]).ok(),
        hour: fields[HOUR].to_string(),
        iso_week: fields[ISO_WEEK].parse().ok(),
        day_name: fields[DAY_NAME].to_string(),
        month: fields[MONTH].to_string(),
        day_type: DayType::parse(fields[DAY_TYPE]),
        lane_id: fields[LANE_ID].to_string(),
        direction: fields[DIRECTION].to_string(),
        from_point: fields[FROM_POINT].to_string(),
        to_point: fields[TO_POINT].to_string(),
        congestion,
    })
}

/// A finite decimal, or `None`. `"NaN"` and `"inf"` are rejected.
fn parse_congestion(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
