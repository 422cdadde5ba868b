//! Logic Module - Business Logic & Engines
//!
//! - `features/` - form answers, feature layout and encoder
//! - `model/` - classifier artifact loading and inference
//! - `explain/` - attribution sources and output normalization
//! - `report/` - ranking and interpretation
//! - `pipeline` - the four steps wired together

pub mod features;
pub mod model;
pub mod explain;
pub mod report;
pub mod pipeline;

pub use pipeline::{Counterfactual, Evaluation, Pipeline};
