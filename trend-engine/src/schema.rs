//! The feature-schema contract.
//!
//! Training-time and prediction-time extraction must agree on column
//! names and order exactly; a previously-fit external classifier decodes
//! rows positionally. Any mismatch is surfaced as a fatal error for that
//! operation. Zero-filling is never silent: it exists only as an opt-in,
//! logged fallback for missing columns.

use tracing::warn;
use trendpulse_core::{FeatureVector, SchemaError};

pub const TEXT_COLUMN: &str = "title";
pub const LABEL_COLUMN: &str = "viral";

/// Canonical numeric feature columns, in the exact order rows are
/// emitted. This order mirrors the field order of [`FeatureVector`].
pub const FEATURE_COLUMNS: [&str; 9] = [
    "title_length",
    "caps_ratio",
    "like_ratio",
    "comment_ratio",
    "velocity",
    "subscriber_count",
    "views_per_video",
    "duration_seconds",
    "publish_hour",
];

/// Header of a persisted dataset: text column, numeric features, label.
pub fn dataset_header() -> Vec<&'static str> {
    let mut header = Vec::with_capacity(FEATURE_COLUMNS.len() + 2);
    header.push(TEXT_COLUMN);
    header.extend(FEATURE_COLUMNS);
    header.push(LABEL_COLUMN);
    header
}

/// The numeric row for one feature vector, in canonical column order.
/// Fails on any non-finite value instead of letting NaN/inf reach a
/// model silently.
pub fn feature_row(features: &FeatureVector) -> Result<[f64; 9], SchemaError> {
    let row = [
        features.title_length,
        features.caps_ratio,
        features.like_ratio,
        features.comment_ratio,
        features.velocity,
        features.subscriber_count,
        features.views_per_video,
        features.duration_seconds,
        features.publish_hour,
    ];
    for (column, value) in FEATURE_COLUMNS.iter().zip(row) {
        if !value.is_finite() {
            return Err(SchemaError::NonFiniteValue {
                column: (*column).to_string(),
                value,
            });
        }
    }
    Ok(row)
}

/// Validates that a found column list matches the canonical numeric
/// schema exactly: same names, same order, nothing extra.
pub fn validate_feature_columns(found: &[String]) -> Result<(), SchemaError> {
    validate_exact(&FEATURE_COLUMNS, found)
}

/// Validates a persisted dataset header (text + features + label).
pub fn validate_dataset_header(found: &[String]) -> Result<(), SchemaError> {
    let expected = dataset_header();
    validate_exact(&expected, found)
}

fn validate_exact(expected: &[&str], found: &[String]) -> Result<(), SchemaError> {
    if expected.len() != found.len() {
        return Err(SchemaError::ColumnCount {
            expected: expected.len(),
            found: found.len(),
        });
    }
    for (position, (want, got)) in expected.iter().zip(found).enumerate() {
        if *want != got.as_str() {
            return Err(SchemaError::ColumnMismatch {
                position,
                expected: (*want).to_string(),
                found: got.clone(),
            });
        }
    }
    Ok(())
}

/// Reorders named values into canonical column order for a classifier
/// that was fit on this schema.
///
/// Unknown columns are always fatal. A missing column is fatal unless
/// `allow_zero_fill` is set, in which case it is zero-filled and logged.
/// Zero-filling is always the explicit fallback, never the default.
pub fn align_columns(
    names: &[String],
    values: &[f64],
    allow_zero_fill: bool,
) -> Result<[f64; 9], SchemaError> {
    if names.len() != values.len() {
        return Err(SchemaError::ColumnCount {
            expected: names.len(),
            found: values.len(),
        });
    }
    for name in names {
        if !FEATURE_COLUMNS.contains(&name.as_str()) {
            return Err(SchemaError::UnexpectedColumn {
                column: name.clone(),
            });
        }
    }

    let mut row = [0.0_f64; 9];
    for (slot, column) in row.iter_mut().zip(FEATURE_COLUMNS) {
        match names.iter().position(|n| n == column) {
            Some(index) => *slot = values[index],
            None if allow_zero_fill => {
                warn!(column, "feature column missing; zero-filling");
            }
            None => {
                return Err(SchemaError::MissingColumn {
                    column: column.to_string(),
                });
            }
        }
    }
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features() -> FeatureVector {
        FeatureVector {
            title_length: 5.0,
            caps_ratio: 0.1,
            like_ratio: 0.04,
            comment_ratio: 0.01,
            velocity: 1200.0,
            subscriber_count: 40_000.0,
            views_per_video: 30_000.0,
            duration_seconds: 300.0,
            publish_hour: 14.0,
        }
    }

    #[test]
    fn training_and_prediction_schemas_are_identical() {
        // The persisted header's numeric slice is exactly the prediction
        // schema; this equality is the contract the model depends on.
        let header = dataset_header();
        let numeric = &header[1..header.len() - 1];
        assert_eq!(numeric, FEATURE_COLUMNS);
    }

    #[test]
    fn feature_row_follows_declaration_order() {
        let row = feature_row(&features()).unwrap();
        assert_eq!(row[0], 5.0);
        assert_eq!(row[4], 1200.0);
        assert_eq!(row[8], 14.0);
    }

    #[test]
    fn non_finite_values_are_fatal() {
        let mut bad = features();
        bad.velocity = f64::NAN;
        assert!(matches!(
            feature_row(&bad),
            Err(SchemaError::NonFiniteValue { .. })
        ));
    }

    #[test]
    fn reordered_columns_are_a_mismatch() {
        let mut shuffled: Vec<String> = FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect();
        shuffled.swap(0, 1);
        assert!(matches!(
            validate_feature_columns(&shuffled),
            Err(SchemaError::ColumnMismatch { position: 0, .. })
        ));
    }

    #[test]
    fn align_reorders_by_name() {
        let names: Vec<String> = FEATURE_COLUMNS.iter().rev().map(|s| s.to_string()).collect();
        let values: Vec<f64> = (0..9).rev().map(|i| i as f64).collect();
        let row = align_columns(&names, &values, false).unwrap();
        assert_eq!(row, [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn unknown_columns_are_always_fatal() {
        let names = vec!["title_length".to_string(), "mystery".to_string()];
        let values = vec![1.0, 2.0];
        assert!(matches!(
            align_columns(&names, &values, true),
            Err(SchemaError::UnexpectedColumn { .. })
        ));
    }

    #[test]
    fn zero_fill_is_opt_in() {
        let names = vec!["title_length".to_string()];
        let values = vec![5.0];
        assert!(matches!(
            align_columns(&names, &values, false),
            Err(SchemaError::MissingColumn { .. })
        ));

        let row = align_columns(&names, &values, true).unwrap();
        assert_eq!(row[0], 5.0);
        assert_eq!(row[1], 0.0);
    }
}
