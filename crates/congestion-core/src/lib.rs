//! Core types for the lane congestion dashboard.
//!
//! Holds the record and filter model, the error taxonomy, percentile
//! statistics, date and label helpers, user notices and the CLI settings
//! shared by every other crate in the workspace.

pub mod error;
pub mod formatting;
pub mod models;
pub mod notifications;
pub mod settings;
pub mod stats;
pub mod time_utils;

pub use error::{CongestionError, Result};
