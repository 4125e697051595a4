//! Unplanned Hospital Visits - data layer
//!
//! Loads the CMS hospital- and state-level CSV files, filters them by the
//! user's measure group, measures and states, and computes the views shown
//! on the dashboard.

pub mod cli;
pub mod config;
pub mod data;
pub mod report;
pub mod stats;
pub mod taxonomy;

pub use data::{DataLoader, DataProcessor, Selection};
pub use stats::DashboardViews;
pub use taxonomy::MeasureGroup;
