//! Analytics over participant records.
//!
//! This module provides the pure aggregation logic behind the dashboard.

pub mod aggregator;

pub use aggregator::{filter_records, summarize, EventFilter};
