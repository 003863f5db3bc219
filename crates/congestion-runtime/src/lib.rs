//! Runtime layer for the lane congestion dashboard.
//!
//! Loads datasets with a primary-to-fallback strategy, owns the dashboard
//! state machine and runs it as an async task driven by UI commands.

pub mod dashboard;
pub mod data_manager;
pub mod orchestrator;

pub use congestion_core as core;
pub use congestion_data as data;
