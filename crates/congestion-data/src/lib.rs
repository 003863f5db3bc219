//! Data layer for the lane congestion dashboard.
//!
//! Parses dataset text into records, evaluates filters, derives filter
//! options and aggregates the filtered subset into monthly, hourly and
//! histogram views.

pub mod aggregator;
pub mod analysis;
pub mod filter;
pub mod parser;

pub use congestion_core as core;
