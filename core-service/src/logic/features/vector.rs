//! Feature Vector - Core data structure for ML input
//!
//! **Versioned feature vector with layout validation**
//!
//! Uses centralized layout from `layout.rs` for:
//! - Consistent feature ordering
//! - Version tracking
//! - Layout hash for compatibility checks

use serde::{Deserialize, Serialize};
use super::layout::{
    FEATURE_COUNT, FEATURE_VERSION, FEATURE_LAYOUT,
    layout_hash, validate_layout, LayoutMismatchError,
};

// ============================================================================
// VERSIONED FEATURE VECTOR
// ============================================================================

/// Versioned Feature Vector with layout metadata
///
/// Values are stored in the order defined by `FEATURE_LAYOUT`. A vector is
/// never edited in place once encoded; use [`FeatureVector::with_value`] to
/// derive a modified copy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Feature layout version
    pub version: u8,
    /// CRC32 hash of the feature layout (for mismatch detection)
    pub layout_hash: u32,
    /// Feature values in order defined by FEATURE_LAYOUT
    pub values: [f32; FEATURE_COUNT],
}

impl FeatureVector {
    /// Create a new zeroed feature vector with current version
    pub fn new() -> Self {
        Self::from_values([0.0; FEATURE_COUNT])
    }

    /// Create from raw values with current version
    pub fn from_values(values: [f32; FEATURE_COUNT]) -> Self {
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values,
        }
    }

    /// Get values as array reference
    pub fn as_array(&self) -> &[f32; FEATURE_COUNT] {
        &self.values
    }

    /// Get values as slice
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get feature by index
    pub fn get(&self, index: usize) -> Option<f32> {
        self.values.get(index).copied()
    }

    /// Get feature by name
    pub fn get_by_name(&self, name: &str) -> Option<f32> {
        super::layout::feature_index(name).and_then(|i| self.get(i))
    }

    /// Copy of this vector with one named feature replaced
    ///
    /// Returns `None` for unknown names. Derived terms are not recomputed;
    /// re-encode a flipped `RawResponse` when they must stay consistent.
    pub fn with_value(&self, name: &str, value: f32) -> Option<Self> {
        let index = super::layout::feature_index(name)?;
        let mut next = *self;
        next.values[index] = value;
        Some(next)
    }

    /// Validate that this vector is compatible with current layout
    pub fn validate(&self) -> Result<(), LayoutMismatchError> {
        validate_layout(self.version, self.layout_hash)
    }

    /// Get feature names for this vector
    pub fn feature_names(&self) -> &'static [&'static str] {
        FEATURE_LAYOUT
    }

    /// Convert to JSON-serializable format for logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "feature_version": self.version,
            "layout_hash": self.layout_hash,
            "values": self.values,
            "named_values": FEATURE_LAYOUT.iter()
                .zip(self.values.iter())
                .map(|(name, value)| (name.to_string(), *value))
                .collect::<std::collections::BTreeMap<_, _>>(),
        })
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::new()
    }
}

impl From<[f32; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f32; FEATURE_COUNT]) -> Self {
        Self::from_values(values)
    }
}

// ============================================================================
// BUILDER PATTERN
// ============================================================================

/// Builder for creating FeatureVector with named setters
///
/// Each setter writes one slot of the layout; the encoder is the only
/// production caller.
pub struct FeatureVectorBuilder {
    values: [f32; FEATURE_COUNT],
}

impl FeatureVectorBuilder {
    pub fn new() -> Self {
        Self { values: [0.0; FEATURE_COUNT] }
    }

    fn set(mut self, name: &str, value: f32) -> Self {
        if let Some(index) = super::layout::feature_index(name) {
            self.values[index] = value;
        }
        self
    }

    pub fn head_of_household(self, value: f32) -> Self {
        self.set("jefehogar", value)
    }

    pub fn male(self, value: f32) -> Self {
        self.set("hombre", value)
    }

    pub fn rural(self, value: f32) -> Self {
        self.set("rural", value)
    }

    pub fn education_years(self, value: f32) -> Self {
        self.set("ESCOACUM", value)
    }

    pub fn age(self, value: f32) -> Self {
        self.set("EDAD", value)
    }

    pub fn age_squared(self, value: f32) -> Self {
        self.set("EDAD2", value)
    }

    pub fn indigenous_language(self, value: f32) -> Self {
        self.set("HLENGUA", value)
    }

    pub fn male_and_married(self, value: f32) -> Self {
        self.set("hombrecasado", value)
    }

    pub fn married(self, value: f32) -> Self {
        self.set("casado", value)
    }

    pub fn indigenous_identity(self, value: f32) -> Self {
        self.set("Ident_Indigena", value)
    }

    pub fn build(self) -> FeatureVector {
        FeatureVector::from_values(self.values)
    }
}

impl Default for FeatureVectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
