//! Random forest fitting and prediction on top of aprender's
//! `RandomForestClassifier`.
//!
//! Prediction goes through the forest's vote shares so ties resolve to the
//! lowest class index instead of depending on hash map iteration order.

use aprender::error::AprenderError;
use aprender::primitives::Matrix;
use aprender::tree::RandomForestClassifier;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForestError {
    #[error("Empty dataset")]
    EmptyDataset,
    #[error("Mismatched X/Y lengths: {rows} rows, {labels} labels")]
    MismatchedLengths { rows: usize, labels: usize },
    #[error("Row {row} contains a non-finite feature value")]
    NonFiniteFeature { row: usize },
    #[error("Label {label} out of range for {n_classes} classes")]
    LabelOutOfRange { label: usize, n_classes: usize },
    #[error("Invalid forest options: {0}")]
    InvalidOptions(String),
    #[error("Forest fit failed: {0}")]
    Fit(#[from] AprenderError),
    #[error("Invalid model: {0}")]
    InvalidModel(String),
}

/// Hyperparameters handed to the forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestOptions {
    pub n_estimators: usize,
    /// Seed for the per-tree bootstrap draws.
    pub seed: u64,
    /// Trees grow until their leaves are pure when `None`.
    pub max_depth: Option<usize>,
}

impl Default for ForestOptions {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            seed: 42,
            max_depth: None,
        }
    }
}

impl ForestOptions {
    pub fn validate(&self) -> Result<(), ForestError> {
        if self.n_estimators == 0 {
            return Err(ForestError::InvalidOptions(
                "n_estimators must be at least 1".to_string(),
            ));
        }
        if self.max_depth == Some(0) {
            return Err(ForestError::InvalidOptions(
                "max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Fit a seeded forest on row-major features `x` and class indices `y`.
///
/// Every index in `0..n_classes` must occur in `y` so the forest's vote
/// shares line up with the class list.
pub fn fit_forest(
    x: &Matrix<f32>,
    y: &[usize],
    n_classes: usize,
    options: &ForestOptions,
) -> Result<RandomForestClassifier, ForestError> {
    options.validate()?;
    let (rows, cols) = x.shape();
    if rows == 0 || cols == 0 {
        return Err(ForestError::EmptyDataset);
    }
    if rows != y.len() {
        return Err(ForestError::MismatchedLengths {
            rows,
            labels: y.len(),
        });
    }
    if let Some(&label) = y.iter().find(|&&label| label >= n_classes) {
        return Err(ForestError::LabelOutOfRange { label, n_classes });
    }
    if let Some(row) = x
        .as_slice()
        .chunks(cols)
        .position(|values| values.iter().any(|v| !v.is_finite()))
    {
        return Err(ForestError::NonFiniteFeature { row });
    }

    let mut forest =
        RandomForestClassifier::new(options.n_estimators).with_random_state(options.seed);
    if let Some(depth) = options.max_depth {
        forest = forest.with_max_depth(depth);
    }
    forest.fit(x, y)?;
    Ok(forest)
}

/// Number of input features a fitted forest expects, or `None` when unfitted.
pub fn fitted_width(forest: &RandomForestClassifier) -> Option<usize> {
    forest.feature_importances().map(|importances| importances.len())
}

/// Vote share per class for each row of `x`.
///
/// Rows are scored one at a time; the forest's batch path re-predicts the
/// whole matrix for every sample.
pub fn class_votes(
    forest: &RandomForestClassifier,
    x: &Matrix<f32>,
) -> Result<Vec<Vec<f32>>, ForestError> {
    let (rows, cols) = x.shape();
    if cols == 0 {
        return Err(ForestError::EmptyDataset);
    }
    let mut out = Vec::with_capacity(rows);
    for values in x.as_slice().chunks(cols) {
        let single = Matrix::from_vec(1, cols, values.to_vec()).map_err(AprenderError::from)?;
        out.push(forest.predict_proba(&single).as_slice().to_vec());
    }
    Ok(out)
}

/// Most voted class; ties go to the lowest index.
pub fn argmax(values: &[f32]) -> usize {
    let mut best_idx = 0usize;
    let mut best_val = f32::NEG_INFINITY;
    for (idx, &v) in values.iter().enumerate() {
        if v > best_val {
            best_val = v;
            best_idx = idx;
        }
    }
    best_idx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blobs() -> (Matrix<f32>, Vec<usize>) {
        let mut data = Vec::new();
        let mut y = Vec::new();
        for i in 0..30 {
            let class = i % 3;
            let jitter = (i / 3) as f32 * 0.01;
            data.push(class as f32 * 5.0 + jitter);
            data.push(1.0 - jitter);
            y.push(class);
        }
        (Matrix::from_vec(30, 2, data).unwrap(), y)
    }

    fn small() -> ForestOptions {
        ForestOptions {
            n_estimators: 10,
            ..ForestOptions::default()
        }
    }

    #[test]
    fn fits_separable_classes() {
        let (x, y) = blobs();
        let forest = fit_forest(&x, &y, 3, &small()).unwrap();
        assert_eq!(fitted_width(&forest), Some(2));

        let votes = class_votes(&forest, &x).unwrap();
        assert_eq!(votes.len(), 30);
        for (row, &label) in votes.iter().zip(&y) {
            assert_eq!(row.len(), 3);
            assert!((row.iter().sum::<f32>() - 1.0).abs() < 1e-5);
            assert_eq!(argmax(row), label);
        }
    }

    #[test]
    fn same_seed_same_votes() {
        let (x, y) = blobs();
        let a = fit_forest(&x, &y, 3, &small()).unwrap();
        let b = fit_forest(&x, &y, 3, &small()).unwrap();
        assert_eq!(class_votes(&a, &x).unwrap(), class_votes(&b, &x).unwrap());
    }

    #[test]
    fn argmax_prefers_lowest_index_on_ties() {
        assert_eq!(argmax(&[0.5, 0.5]), 0);
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), 1);
    }

    #[test]
    fn rejects_bad_inputs() {
        let (x, y) = blobs();
        assert!(matches!(
            fit_forest(&x, &y[..10], 3, &small()),
            Err(ForestError::MismatchedLengths { rows: 30, labels: 10 })
        ));
        assert!(matches!(
            fit_forest(&x, &y, 2, &small()),
            Err(ForestError::LabelOutOfRange { label: 2, n_classes: 2 })
        ));
        let zero_trees = ForestOptions {
            n_estimators: 0,
            ..ForestOptions::default()
        };
        assert!(matches!(
            fit_forest(&x, &y, 3, &zero_trees),
            Err(ForestError::InvalidOptions(_))
        ));

        let mut data = x.as_slice().to_vec();
        data[7] = f32::NAN;
        let x = Matrix::from_vec(30, 2, data).unwrap();
        assert!(matches!(
            fit_forest(&x, &y, 3, &small()),
            Err(ForestError::NonFiniteFeature { row: 3 })
        ));
    }

    #[test]
    fn unfitted_forest_has_no_width() {
        assert_eq!(fitted_width(&RandomForestClassifier::new(3)), None);
    }
}
