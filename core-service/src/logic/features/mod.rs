//! Features Module - Feature Encoding Engine
//!
//! Turns form answers into the ordered numeric vector the classifier expects.

pub mod layout;
pub mod response;
pub mod vector;
pub mod encoder;


// Re-export common types
pub use layout::{
    feature_index, feature_label, feature_name, FeatureKind, LayoutInfo, LayoutMismatchError,
    FEATURE_COUNT, FEATURE_KINDS, FEATURE_LABELS, FEATURE_LAYOUT, FEATURE_VERSION,
};
pub use response::{Age, BinaryField, EducationYears, Gender, RawResponse, ResponseError, YesNo};
pub use vector::{FeatureVector, FeatureVectorBuilder};
pub use encoder::encode;
