//! Small line-producing building blocks shared by the dashboard view.

pub mod filter_panel;
pub mod header;
pub mod indicators;
pub mod progress_bar;
