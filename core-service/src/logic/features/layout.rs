//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema**
//!
//! The classifier was trained on exactly this order. Reordering silently
//! corrupts every prediction (the model still returns a plausible number),
//! so the order is pinned by a layout hash that model manifests must match.
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
/// MUST be incremented when layout changes
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature identifiers in exact order they appear in the vector
/// This is the SINGLE SOURCE OF TRUTH for feature layout
pub const FEATURE_LAYOUT: &[&str] = &[
    "jefehogar",        // 0: head of household (0/1)
    "hombre",           // 1: male (0/1)
    "rural",            // 2: rural residence (0/1)
    "ESCOACUM",         // 3: accumulated years of education
    "EDAD",             // 4: age
    "EDAD2",            // 5: age squared
    "HLENGUA",          // 6: speaks an indigenous language (0/1)
    "hombrecasado",     // 7: male AND married (0/1)
    "casado",           // 8: married (0/1)
    "Ident_Indigena",   // 9: self-identifies as indigenous (0/1)
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 10;

/// Human-readable labels, same order as `FEATURE_LAYOUT`
pub const FEATURE_LABELS: [&str; FEATURE_COUNT] = [
    "Jefe(a) de hogar",
    "Género",
    "Vive en zona rural",
    "Años de educación acumulada",
    "Edad",
    "Edad al cuadrado",
    "Habla una lengua indígena",
    "Hombre casado",
    "Casado(a)",
    "Se identifica como indígena",
];

/// How a feature value is shown back to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// 0/1 mapped back to a pair of category labels (false, true)
    Binary { off: &'static str, on: &'static str },
    /// Integer count or derived numeric term
    Numeric,
}

/// Display kind per feature, same order as `FEATURE_LAYOUT`
pub const FEATURE_KINDS: [FeatureKind; FEATURE_COUNT] = [
    FeatureKind::Binary { off: "No", on: "Sí" },
    FeatureKind::Binary { off: "Mujer", on: "Hombre" },
    FeatureKind::Binary { off: "No", on: "Sí" },
    FeatureKind::Numeric,
    FeatureKind::Numeric,
    FeatureKind::Numeric,
    FeatureKind::Binary { off: "No", on: "Sí" },
    FeatureKind::Binary { off: "No", on: "Sí" },
    FeatureKind::Binary { off: "No", on: "Sí" },
    FeatureKind::Binary { off: "No", on: "Sí" },
];

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute CRC32 hash of an ordered list of feature names
pub fn compute_hash_of<S: AsRef<str>>(version: u8, names: &[S]) -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[version]);

    for name in names {
        hasher.update(name.as_ref().as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

/// CRC32 hash of the feature layout
/// Used to detect layout mismatches at runtime
pub fn layout_hash() -> u32 {
    compute_hash_of(FEATURE_VERSION, FEATURE_LAYOUT)
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
    pub feature_labels: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
            feature_labels: FEATURE_LABELS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when feature layout doesn't match expected
#[derive(Debug, Clone, thiserror::Error)]
#[error(
    "Feature layout mismatch: expected v{expected_version} (hash: {expected_hash:08x}), \
     got v{actual_version} (hash: {actual_hash:08x})"
)]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

/// Validate that incoming data matches current layout
pub fn validate_layout(incoming_version: u8, incoming_hash: u32) -> Result<(), LayoutMismatchError> {
    let current_hash = layout_hash();

    if incoming_version != FEATURE_VERSION || incoming_hash != current_hash {
        return Err(LayoutMismatchError {
            expected_version: FEATURE_VERSION,
            expected_hash: current_hash,
            actual_version: incoming_version,
            actual_hash: incoming_hash,
        });
    }

    Ok(())
}

/// Validate an ordered list of feature names (e.g. from a model manifest)
pub fn validate_feature_names<S: AsRef<str>>(version: u8, names: &[S]) -> Result<(), LayoutMismatchError> {
    validate_layout(version, compute_hash_of(version, names))
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Get feature index by name (O(n) but features are few)
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

/// Get feature name by index
pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).copied()
}

/// Get feature label by index
pub fn feature_label(index: usize) -> Option<&'static str> {
    FEATURE_LABELS.get(index).copied()
}

// ============================================================================
// TESTS
// ============================================================================
