use serde::{Deserialize, Serialize};

/// Effect of one feature on the positive-class probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Increases,
    Decreases,
}

impl Direction {
    /// Only a strictly positive score counts as raising the probability
    pub fn of(attribution: f32) -> Self {
        if attribution > 0.0 {
            Direction::Increases
        } else {
            Direction::Decreases
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            Direction::Increases => "aumenta",
            Direction::Decreases => "disminuye",
        }
    }
}

/// Row ordering; both keys give the same order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Magnitude,
    Share,
}

/// One feature's contribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionRow {
    /// Position in the feature layout
    pub index: usize,
    pub feature: String,
    pub label: String,
    /// Encoded value
    pub value: f32,
    /// "Sí", "Mujer", "12", ...
    pub display_value: String,
    pub attribution: f32,
    pub magnitude: f32,
    /// Percent of total magnitude, two decimals
    pub share_pct: f32,
    pub direction: Direction,
    pub sentence: String,
}

/// Ranked breakdown of one prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub probability: f32,
    pub probability_text: String,
    pub expected_value: f32,
    pub total_magnitude: f32,
    pub rows: Vec<AttributionRow>,
}

impl Report {
    /// Largest share among the shown rows, for chart scaling
    pub fn max_share(&self) -> f32 {
        self.rows.iter().map(|r| r.share_pct).fold(0.0, f32::max)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReportOptions {
    pub top_n: usize,
    #[serde(default)]
    pub sort_key: SortKey,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            top_n: crate::constants::DEFAULT_TOP_FEATURES,
            sort_key: SortKey::Magnitude,
        }
    }
}
