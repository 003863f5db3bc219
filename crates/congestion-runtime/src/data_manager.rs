//! Data sources and the primary-then-fallback load.
//!
//! A [`DataSource`] turns a source name into raw text. [`load_with_fallback`]
//! tries the primary dataset, falls back to the sample dataset exactly once,
//! and reports what happened as a [`LoadOutcome`] instead of an error.

use std::path::{Path, PathBuf};

use congestion_core::error::{CongestionError, Result};
use congestion_core::models::Record;
use congestion_data::parser::parse_with_report;

// ── DataSource ────────────────────────────────────────────────────────────────

/// Anything that can return the text of a named dataset.
///
/// Timeouts, if any, are the source's own concern.
pub trait DataSource {
    fn fetch_text(&self, name: &str) -> Result<String>;
}

/// Reads datasets from files in a data directory.
#[derive(Debug, Clone)]
pub struct FileDataSource {
    data_dir: PathBuf,
}

impl FileDataSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl DataSource for FileDataSource {
    fn fetch_text(&self, name: &str) -> Result<String> {
        let path = self.data_dir.join(name);
        tracing::debug!(path = %path.display(), "reading dataset");
        std::fs::read_to_string(&path).map_err(|source| CongestionError::SourceRead {
            name: name.to_string(),
            source,
        })
    }
}

// ── LoadOutcome ───────────────────────────────────────────────────────────────

/// Result of a two-stage load. `rejected` counts malformed lines skipped.
#[derive(Debug)]
pub enum LoadOutcome {
    PrimaryOk {
        records: Vec<Record>,
        rejected: usize,
    },
    FallbackOk {
        records: Vec<Record>,
        rejected: usize,
        primary_error: CongestionError,
    },
    BothFailed {
        primary_error: CongestionError,
        fallback_error: CongestionError,
    },
}

impl LoadOutcome {
    /// The loaded records, `None` when both sources failed.
    pub fn records(&self) -> Option<&[Record]> {
        match self {
            LoadOutcome::PrimaryOk { records, .. } | LoadOutcome::FallbackOk { records, .. } => {
                Some(records)
            }
            LoadOutcome::BothFailed { .. } => None,
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Load `primary`, or `fallback` when the primary cannot be read or yields no
/// valid records. The fallback is attempted at most once.
pub fn load_with_fallback(source: &dyn DataSource, primary: &str, fallback: &str) -> LoadOutcome {
    let primary_error = match load_one(source, primary) {
        Ok((records, rejected)) => {
            tracing::info!(source = primary, records = records.len(), rejected, "loaded primary dataset");
            return LoadOutcome::PrimaryOk { records, rejected };
        }
        Err(e) => e,
    };
    tracing::warn!(source = primary, error = %primary_error, "primary dataset unavailable; trying fallback");

    match load_one(source, fallback) {
        Ok((records, rejected)) => {
            tracing::info!(source = fallback, records = records.len(), rejected, "loaded fallback dataset");
            LoadOutcome::FallbackOk {
                records,
                rejected,
                primary_error,
            }
        }
        Err(fallback_error) => {
            tracing::warn!(source = fallback, error = %fallback_error, "fallback dataset unavailable");
            LoadOutcome::BothFailed {
                primary_error,
                fallback_error,
            }
        }
    }
}

fn load_one(source: &dyn DataSource, name: &str) -> Result<(Vec<Record>, usize)> {
    let text = source.fetch_text(name)?;
    let report = parse_with_report(&text);
    if report.records.is_empty() {
        return Err(CongestionError::EmptyDataset {
            name: name.to_string(),
        });
    }
    Ok((report.records, report.rejections.len()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
