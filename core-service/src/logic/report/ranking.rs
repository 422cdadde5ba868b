//! Ranking - attribution rows, shares and ordering

use std::cmp::Ordering;

use crate::error::{CoreError, CoreResult};
use crate::logic::explain::Attribution;
use crate::logic::features::{FeatureKind, FeatureVector, FEATURE_KINDS, FEATURE_LABELS, FEATURE_LAYOUT};
use crate::logic::model::Prediction;

use super::types::{AttributionRow, Direction, Report, ReportOptions, SortKey};

/// Round to two decimals
fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

/// Category label for binary features, integer for numeric ones
pub fn display_value(kind: FeatureKind, value: f32) -> String {
    match kind {
        FeatureKind::Binary { off, on } => {
            if value >= 0.5 {
                on.to_string()
            } else {
                off.to_string()
            }
        }
        FeatureKind::Numeric => format!("{}", value.round() as i64),
    }
}

fn sentence(label: &str, display: &str, direction: Direction) -> String {
    format!("{} = {} {} la probabilidad de estar empleado(a)", label, display, direction.verb())
}

/// One row per feature, layout order
pub fn build_rows(features: &FeatureVector, attribution: &Attribution) -> CoreResult<Vec<AttributionRow>> {
    if attribution.values.len() != features.len() {
        log::warn!(
            "Attribution has {} values for {} features",
            attribution.values.len(),
            features.len()
        );
        return Err(CoreError::ConfigurationDrift {
            expected: features.len(),
            actual: attribution.values.len(),
        });
    }

    let total = attribution.total_magnitude();

    let rows = features
        .as_slice()
        .iter()
        .zip(&attribution.values)
        .enumerate()
        .map(|(index, (&value, &score))| {
            let magnitude = score.abs();
            let share_pct = if total > 0.0 { round2(magnitude / total * 100.0) } else { 0.0 };
            let direction = Direction::of(score);
            let label = FEATURE_LABELS[index];
            let display = display_value(FEATURE_KINDS[index], value);

            AttributionRow {
                index,
                feature: FEATURE_LAYOUT[index].to_string(),
                label: label.to_string(),
                value,
                sentence: sentence(label, &display, direction),
                display_value: display,
                attribution: score,
                magnitude,
                share_pct,
                direction,
            }
        })
        .collect();

    Ok(rows)
}

/// Shares are magnitudes over one shared total, so both keys rank on the
/// unrounded magnitude. `share_pct` is rounded for display only.
fn compare_rows(a: &AttributionRow, b: &AttributionRow, key: SortKey) -> Ordering {
    let ordering = match key {
        SortKey::Magnitude | SortKey::Share => b.magnitude.total_cmp(&a.magnitude),
    };
    ordering.then(a.index.cmp(&b.index))
}

/// Descending; equal keys keep layout order
pub fn sort_rows(rows: &mut [AttributionRow], key: SortKey) {
    rows.sort_by(|a, b| compare_rows(a, b, key));
}

pub fn truncate(rows: &mut Vec<AttributionRow>, top_n: usize) {
    rows.truncate(top_n);
}

/// Full report: rows sorted, cut to `top_n`
pub fn rank(
    features: &FeatureVector,
    prediction: &Prediction,
    attribution: &Attribution,
    options: &ReportOptions,
) -> CoreResult<Report> {
    let mut rows = build_rows(features, attribution)?;
    sort_rows(&mut rows, options.sort_key);
    truncate(&mut rows, options.top_n);

    Ok(Report {
        probability: prediction.probability,
        probability_text: prediction.percent_text(),
        expected_value: attribution.expected_value,
        total_magnitude: attribution.total_magnitude(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::{encode, RawResponse, YesNo, FEATURE_COUNT};

    fn attribution(values: Vec<f32>) -> Attribution {
        Attribution {
            values,
            expected_value: 0.5,
        }
    }

    fn prediction(probability: f32) -> Prediction {
        Prediction {
            probability,
            positive_class: 1,
            inference_time_us: 0,
        }
    }

    fn sample_values() -> Vec<f32> {
        vec![0.02, -0.11, 0.0, 0.31, -0.07, 0.05, -0.013, 0.004, 0.09, -0.2]
    }

    #[test]
    fn test_shares_sum_to_hundred() {
        let features = encode(&RawResponse::default());
        let rows = build_rows(&features, &attribution(sample_values())).unwrap();

        let sum: f32 = rows.iter().map(|r| r.share_pct).sum();
        assert!((sum - 100.0).abs() <= 0.01 * FEATURE_COUNT as f32, "sum was {}", sum);
    }

    #[test]
    fn test_all_zero_attributions_give_zero_shares() {
        let features = encode(&RawResponse::default());
        let rows = build_rows(&features, &attribution(vec![0.0; FEATURE_COUNT])).unwrap();

        for row in &rows {
            assert_eq!(row.share_pct, 0.0);
            assert!(!row.share_pct.is_nan());
            assert_eq!(row.direction, Direction::Decreases);
        }
    }

    #[test]
    fn test_sort_descending_and_idempotent() {
        let features = encode(&RawResponse::default());
        let mut rows = build_rows(&features, &attribution(sample_values())).unwrap();

        sort_rows(&mut rows, SortKey::Magnitude);
        let order: Vec<usize> = rows.iter().map(|r| r.index).collect();
        assert_eq!(order[0], 3);
        assert_eq!(order[1], 9);
        assert!(rows.windows(2).all(|w| w[0].magnitude >= w[1].magnitude));

        sort_rows(&mut rows, SortKey::Magnitude);
        let again: Vec<usize> = rows.iter().map(|r| r.index).collect();
        assert_eq!(order, again);

        sort_rows(&mut rows, SortKey::Share);
        let by_share: Vec<usize> = rows.iter().map(|r| r.index).collect();
        assert_eq!(order, by_share);
    }

    #[test]
    fn test_ties_keep_layout_order() {
        let features = encode(&RawResponse::default());
        let mut values = vec![0.0; FEATURE_COUNT];
        values[7] = 0.1;
        values[2] = -0.1;
        values[5] = 0.1;
        let mut rows = build_rows(&features, &attribution(values)).unwrap();

        sort_rows(&mut rows, SortKey::Magnitude);
        let order: Vec<usize> = rows.iter().take(3).map(|r| r.index).collect();
        assert_eq!(order, vec![2, 5, 7]);
    }

    #[test]
    fn test_share_sort_ignores_display_rounding() {
        let features = encode(&RawResponse::default());
        let mut values = vec![0.0; FEATURE_COUNT];
        values[0] = 0.10000;
        values[1] = 0.10001;
        let mut rows = build_rows(&features, &attribution(values)).unwrap();
        assert_eq!(rows[0].share_pct, rows[1].share_pct);

        sort_rows(&mut rows, SortKey::Magnitude);
        let by_magnitude: Vec<usize> = rows.iter().map(|r| r.index).collect();
        sort_rows(&mut rows, SortKey::Share);
        let by_share: Vec<usize> = rows.iter().map(|r| r.index).collect();

        assert_eq!(by_magnitude[..2], [1, 0]);
        assert_eq!(by_share, by_magnitude);
    }

    #[test]
    fn test_display_values_are_humanized() {
        let response = RawResponse {
            married: YesNo::Si,
            ..RawResponse::default()
        };
        let features = encode(&response);
        let rows = build_rows(&features, &attribution(sample_values())).unwrap();

        assert_eq!(rows[1].display_value, "Mujer");
        assert_eq!(rows[3].display_value, "12");
        assert_eq!(rows[5].display_value, "900");
        assert_eq!(rows[8].display_value, "Sí");
        assert_eq!(rows[0].display_value, "No");
    }

    #[test]
    fn test_sentences_follow_sign() {
        let features = encode(&RawResponse::default());
        let rows = build_rows(&features, &attribution(sample_values())).unwrap();

        assert_eq!(rows[3].direction, Direction::Increases);
        assert!(rows[3].sentence.contains("aumenta"));
        assert_eq!(rows[1].direction, Direction::Decreases);
        assert!(rows[1].sentence.contains("disminuye"));
        // exactly zero
        assert!(rows[2].sentence.contains("disminuye"));
    }

    #[test]
    fn test_rank_truncates_and_formats() {
        let features = encode(&RawResponse::default());
        let options = ReportOptions {
            top_n: 3,
            ..ReportOptions::default()
        };
        let report = rank(&features, &prediction(0.62), &attribution(sample_values()), &options).unwrap();

        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.probability_text, "62.00%");
        assert_eq!(report.expected_value, 0.5);
        assert_eq!(report.rows[0].feature, "ESCOACUM");
    }

    #[test]
    fn test_rank_default_keeps_all_features() {
        let features = encode(&RawResponse::default());
        let report = rank(&features, &prediction(0.5), &attribution(sample_values()), &ReportOptions::default()).unwrap();
        assert_eq!(report.rows.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_wrong_attribution_length_is_drift() {
        let features = encode(&RawResponse::default());
        let result = build_rows(&features, &attribution(vec![0.1; 9]));
        assert!(matches!(
            result,
            Err(CoreError::ConfigurationDrift { expected: 10, actual: 9 })
        ));
    }
}
