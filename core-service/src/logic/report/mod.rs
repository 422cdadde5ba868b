//! Report Module - ranked, human-readable attribution breakdown

pub mod types;
pub mod ranking;

pub use types::{AttributionRow, Direction, Report, ReportOptions, SortKey};
pub use ranking::{build_rows, display_value, rank, sort_rows, truncate};
