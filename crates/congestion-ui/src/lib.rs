//! Terminal UI layer for the lane congestion dashboard.
//!
//! Provides themes, the header, filter panel and indicator components, the
//! chart-based dashboard view, and the application event loop built on top
//! of [`ratatui`].

pub mod app;
pub mod components;
pub mod dashboard_view;
pub mod stats_table;
pub mod themes;

pub use congestion_runtime as runtime;
