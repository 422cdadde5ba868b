//! Central Configuration Constants
//!
//! Single source of truth for input bounds and engine defaults.

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Predicción de Probabilidad de Empleo";

// ============================================
// Input bounds (form sliders)
// ============================================

pub const EDUCATION_MIN: u8 = 0;
pub const EDUCATION_MAX: u8 = 30;
pub const DEFAULT_EDUCATION_YEARS: u8 = 12;

pub const AGE_MIN: u8 = 15;
pub const AGE_MAX: u8 = 100;
pub const DEFAULT_AGE: u8 = 30;

// ============================================
// Engine defaults
// ============================================

/// Index of the "employed" class in the classifier output
pub const DEFAULT_POSITIVE_CLASS: usize = 1;

/// Binary classifier
pub const DEFAULT_CLASS_COUNT: usize = 2;

/// Rows shown in the ranking table
pub const DEFAULT_TOP_FEATURES: usize = 10;

/// Background rows kept for the Shapley explainer
pub const DEFAULT_BACKGROUND_LIMIT: usize = 64;

/// Seed for background subsampling
pub const DEFAULT_BACKGROUND_SEED: u64 = 42;

/// Exact Shapley enumerates 2^n coalitions; refuse wider inputs
pub const MAX_EXACT_SHAPLEY_FEATURES: usize = 16;

/// Default ONNX tensor names as exported by skl2onnx with `zipmap=False`
pub const DEFAULT_INPUT_NAME: &str = "float_input";
pub const DEFAULT_PROBABILITY_OUTPUT: &str = "probabilities";
