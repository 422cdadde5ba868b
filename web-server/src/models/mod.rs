//! Data models

pub mod form;
pub mod report;

pub use form::*;
pub use report::*;
