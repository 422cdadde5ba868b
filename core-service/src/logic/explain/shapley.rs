//! Exact interventional Shapley explainer
//!
//! For a model with n inputs every coalition S ⊆ N is evaluated as the mean
//! prediction over the background rows with features in S taken from the
//! explained individual and the rest from the background row:
//!
//! ```text
//! v(S)  = mean_b f(x_S, b_{N\S})
//! φ_i   = Σ_{S ⊆ N\{i}} |S|! (n-|S|-1)! / n! · (v(S ∪ {i}) - v(S))
//! ```
//!
//! `v(∅)` is the expected value, so `v(∅) + Σ φ_i = f(x)` holds exactly.
//! All 2ⁿ · |background| rows go to the classifier in a single batch.

use std::path::Path;
use std::sync::Arc;

use ndarray::{Array2, Array3, ArrayView1, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::constants::MAX_EXACT_SHAPLEY_FEATURES;
use crate::error::CoreResult;
use crate::logic::features::{encode, RawResponse};
use crate::logic::model::{read_artifact, Classifier};

use super::engine::AttributionSource;
use super::types::{AttributionError, AttributionOutput, OutputLayout, RawAttribution};

// ============================================================================
// BACKGROUND DATA
// ============================================================================

/// Background holding only the form's default individual
pub fn reference_background() -> Array2<f32> {
    let reference = encode(&RawResponse::default());
    Array2::from_shape_vec((1, reference.len()), reference.as_slice().to_vec())
        .unwrap_or_else(|_| Array2::zeros((1, reference.len())))
}

/// Load a JSON matrix (`[[f32; width], ...]`), keeping at most `limit` rows
///
/// Larger files are subsampled with a seeded RNG so restarts explain the same
/// way; kept rows stay in file order.
pub fn load_background(path: &Path, width: usize, limit: usize, seed: u64) -> CoreResult<Array2<f32>> {
    let bytes = read_artifact(path, None)?;
    let rows: Vec<Vec<f32>> = serde_json::from_slice(&bytes)
        .map_err(|e| AttributionError::Background(format!("{}: {}", path.display(), e)))?;

    let background = subsample(rows, width, limit, seed)?;
    log::info!(
        "Background loaded from {} ({} rows)",
        path.display(),
        background.nrows()
    );
    Ok(background)
}

fn subsample(rows: Vec<Vec<f32>>, width: usize, limit: usize, seed: u64) -> Result<Array2<f32>, AttributionError> {
    if rows.is_empty() || limit == 0 {
        return Err(AttributionError::Background("no background rows".to_string()));
    }
    if let Some((index, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
        return Err(AttributionError::Background(format!(
            "row {} has {} values, expected {}",
            index,
            row.len(),
            width
        )));
    }

    let kept: Vec<Vec<f32>> = if rows.len() > limit {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut indices = rand::seq::index::sample(&mut rng, rows.len(), limit).into_vec();
        indices.sort_unstable();
        indices.into_iter().map(|i| rows[i].clone()).collect()
    } else {
        rows
    };

    let count = kept.len();
    Array2::from_shape_vec((count, width), kept.into_iter().flatten().collect())
        .map_err(|e| AttributionError::Background(e.to_string()))
}

// ============================================================================
// EXPLAINER
// ============================================================================

pub struct ShapleyExplainer {
    classifier: Arc<dyn Classifier>,
    background: Array2<f32>,
    /// Mean background prediction per class
    expected_value: Vec<f32>,
    /// Coalition weight by coalition size
    weights: Vec<f64>,
}

fn factorial(k: usize) -> f64 {
    (1..=k).map(|i| i as f64).product()
}

impl ShapleyExplainer {
    /// Build against the classifier; evaluates the background once
    pub fn new(classifier: Arc<dyn Classifier>, background: Array2<f32>) -> Result<Self, AttributionError> {
        let n = classifier.input_width();
        if n > MAX_EXACT_SHAPLEY_FEATURES {
            return Err(AttributionError::TooManyFeatures {
                features: n,
                max: MAX_EXACT_SHAPLEY_FEATURES,
            });
        }
        if background.nrows() == 0 || background.ncols() != n {
            return Err(AttributionError::Background(format!(
                "background shape {:?} does not fit {} features",
                background.shape(),
                n
            )));
        }

        let probabilities = classifier.predict_proba(background.view())?;
        let expected_value = probabilities
            .mean_axis(Axis(0))
            .map(|m| m.to_vec())
            .ok_or_else(|| AttributionError::Background("empty background prediction".to_string()))?;

        let n_fact = factorial(n);
        let weights = (0..n)
            .map(|s| factorial(s) * factorial(n - s - 1) / n_fact)
            .collect();

        log::info!(
            "Shapley explainer ready: {} features, {} background rows, expected {:?}",
            n,
            background.nrows(),
            expected_value
        );

        Ok(Self {
            classifier,
            background,
            expected_value,
            weights,
        })
    }

    /// `v(S)` for every coalition mask: `(2^n, classes)`
    fn coalition_values(&self, x: ArrayView1<'_, f32>) -> Result<Array2<f64>, AttributionError> {
        let n = x.len();
        let coalitions = 1usize << n;
        let rows = self.background.nrows();

        let mut batch = Array2::<f32>::zeros((coalitions * rows, n));
        for mask in 0..coalitions {
            for (b, background_row) in self.background.outer_iter().enumerate() {
                let mut row = batch.row_mut(mask * rows + b);
                for j in 0..n {
                    row[j] = if (mask >> j) & 1 == 1 { x[j] } else { background_row[j] };
                }
            }
        }

        let probabilities = self.classifier.predict_proba(batch.view())?;
        let classes = self.expected_value.len();
        if probabilities.shape() != [coalitions * rows, classes] {
            return Err(AttributionError::Inference(crate::logic::model::InferenceError(format!(
                "Expected probabilities of shape ({}, {}), got {:?}",
                coalitions * rows,
                classes,
                probabilities.shape()
            ))));
        }

        let mut values = Array2::<f64>::zeros((coalitions, classes));
        for mask in 0..coalitions {
            for b in 0..rows {
                for k in 0..classes {
                    values[[mask, k]] += f64::from(probabilities[[mask * rows + b, k]]);
                }
            }
        }
        values /= rows as f64;
        Ok(values)
    }

    /// Shapley values for one individual: `(features, classes)`
    fn explain_one(&self, x: ArrayView1<'_, f32>) -> Result<Array2<f32>, AttributionError> {
        let n = x.len();
        let values = self.coalition_values(x)?;
        let classes = values.ncols();

        let mut phi = Array2::<f32>::zeros((n, classes));
        for i in 0..n {
            let bit = 1usize << i;
            for k in 0..classes {
                let mut total = 0.0f64;
                for mask in (0..(1usize << n)).filter(|m| m & bit == 0) {
                    let size = mask.count_ones() as usize;
                    total += self.weights[size] * (values[[mask | bit, k]] - values[[mask, k]]);
                }
                phi[[i, k]] = total as f32;
            }
        }
        Ok(phi)
    }
}

impl AttributionSource for ShapleyExplainer {
    fn name(&self) -> &str {
        "exact-shapley"
    }

    fn layout(&self) -> OutputLayout {
        OutputLayout::ClassAxis
    }

    fn explain(&self, batch: ArrayView2<'_, f32>) -> Result<RawAttribution, AttributionError> {
        let n = self.background.ncols();
        if batch.ncols() != n {
            return Err(AttributionError::UnrecognizedShape {
                layout: OutputLayout::ClassAxis,
                shape: batch.shape().to_vec(),
            });
        }

        let classes = self.expected_value.len();
        let mut output = Array3::<f32>::zeros((batch.nrows(), n, classes));
        for (sample, x) in batch.outer_iter().enumerate() {
            let phi = self.explain_one(x)?;
            output.index_axis_mut(Axis(0), sample).assign(&phi);
        }

        Ok(RawAttribution {
            output: AttributionOutput::ClassAxis(output),
            expected_value: self.expected_value.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::{InferenceError, ModelMetadata};

    /// p(employed) = 0.2 + Σ w_j x_j, no interactions
    struct LinearClassifier {
        metadata: ModelMetadata,
        weights: Vec<f32>,
    }

    impl Classifier for LinearClassifier {
        fn metadata(&self) -> &ModelMetadata {
            &self.metadata
        }

        fn predict_proba(&self, batch: ArrayView2<'_, f32>) -> Result<Array2<f32>, InferenceError> {
            let mut out = Array2::zeros((batch.nrows(), 2));
            for (r, row) in batch.outer_iter().enumerate() {
                let p: f32 = 0.2 + row.iter().zip(&self.weights).map(|(x, w)| x * w).sum::<f32>();
                out[[r, 0]] = 1.0 - p;
                out[[r, 1]] = p;
            }
            Ok(out)
        }
    }

    /// p = 0.1 + 0.4 · x0 · x1 (pure interaction)
    struct AndClassifier {
        metadata: ModelMetadata,
    }

    impl Classifier for AndClassifier {
        fn metadata(&self) -> &ModelMetadata {
            &self.metadata
        }

        fn predict_proba(&self, batch: ArrayView2<'_, f32>) -> Result<Array2<f32>, InferenceError> {
            let mut out = Array2::zeros((batch.nrows(), 2));
            for (r, row) in batch.outer_iter().enumerate() {
                let p = 0.1 + 0.4 * row[0] * row[1];
                out[[r, 0]] = 1.0 - p;
                out[[r, 1]] = p;
            }
            Ok(out)
        }
    }

    fn linear() -> Arc<dyn Classifier> {
        Arc::new(LinearClassifier {
            metadata: ModelMetadata::new("linear", 3),
            weights: vec![0.1, -0.05, 0.02],
        })
    }

    #[test]
    fn test_linear_model_attribution_is_weight_times_delta() {
        let background = Array2::from_shape_vec((1, 3), vec![0.0, 0.0, 0.0]).unwrap();
        let explainer = ShapleyExplainer::new(linear(), background).unwrap();

        let x = Array2::from_shape_vec((1, 3), vec![1.0, 2.0, 5.0]).unwrap();
        let raw = explainer.explain(x.view()).unwrap();

        let AttributionOutput::ClassAxis(phi) = raw.output else {
            panic!("Expected class axis output");
        };
        assert_eq!(phi.shape(), &[1, 3, 2]);
        assert!((phi[[0, 0, 1]] - 0.1).abs() < 1e-5);
        assert!((phi[[0, 1, 1]] + 0.1).abs() < 1e-5);
        assert!((phi[[0, 2, 1]] - 0.1).abs() < 1e-5);
        // Negative class mirrors the positive one
        assert!((phi[[0, 0, 0]] + 0.1).abs() < 1e-5);
        assert!((raw.expected_value[1] - 0.2).abs() < 1e-5);
    }

    #[test]
    fn test_local_accuracy_with_interaction() {
        let classifier: Arc<dyn Classifier> = Arc::new(AndClassifier {
            metadata: ModelMetadata::new("and", 2),
        });
        let background = Array2::from_shape_vec((2, 2), vec![0.0, 0.0, 1.0, 0.0]).unwrap();
        let explainer = ShapleyExplainer::new(classifier.clone(), background).unwrap();

        let x = Array2::from_shape_vec((1, 2), vec![1.0, 1.0]).unwrap();
        let raw = explainer.explain(x.view()).unwrap();
        let AttributionOutput::ClassAxis(phi) = raw.output else {
            panic!("Expected class axis output");
        };

        let prediction = classifier.predict_proba(x.view()).unwrap()[[0, 1]];
        let total: f32 = phi[[0, 0, 1]] + phi[[0, 1, 1]];
        assert!((raw.expected_value[1] + total - prediction).abs() < 1e-5);
        // x1 differs from every background row, x0 from only one
        assert!(phi[[0, 1, 1]] > phi[[0, 0, 1]]);
    }

    #[test]
    fn test_background_width_checked() {
        let background = Array2::zeros((1, 4));
        assert!(matches!(
            ShapleyExplainer::new(linear(), background),
            Err(AttributionError::Background(_))
        ));
    }

    #[test]
    fn test_reference_background_is_default_individual() {
        let background = reference_background();
        assert_eq!(background.shape(), &[1, 10]);
        assert_eq!(background[[0, 3]], 12.0);
        assert_eq!(background[[0, 5]], 900.0);
    }

    #[test]
    fn test_subsample_is_deterministic_and_ordered() {
        let rows: Vec<Vec<f32>> = (0..100).map(|i| vec![i as f32, 0.0]).collect();

        let a = subsample(rows.clone(), 2, 10, 7).unwrap();
        let b = subsample(rows.clone(), 2, 10, 7).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.nrows(), 10);
        let firsts: Vec<f32> = a.column(0).to_vec();
        assert!(firsts.windows(2).all(|w| w[0] < w[1]));

        let all = subsample(rows, 2, 1000, 7).unwrap();
        assert_eq!(all.nrows(), 100);
    }

    #[test]
    fn test_subsample_rejects_ragged_rows() {
        let rows = vec![vec![0.0, 1.0], vec![0.0]];
        assert!(matches!(subsample(rows, 2, 10, 1), Err(AttributionError::Background(_))));
    }

    #[test]
    fn test_load_background_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("background.json");
        std::fs::write(&path, "[[0,1,2],[3,4,5]]").unwrap();

        let background = load_background(&path, 3, 64, 42).unwrap();
        assert_eq!(background.shape(), &[2, 3]);
        assert_eq!(background[[1, 2]], 5.0);
    }
}
