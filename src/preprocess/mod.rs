//! Column-wise feature transform: aprender's `StandardScaler` for numeric
//! columns and one-hot encoding for categorical columns.
//!
//! The output row is the scaled numeric block followed by the indicator
//! blocks, in schema order.

mod onehot;

pub use onehot::OneHotEncoder;

use aprender::error::AprenderError;
use aprender::preprocessing::StandardScaler;
use aprender::primitives::Matrix;
use aprender::traits::Transformer;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dataset::{FeatureRow, FeatureSchema};

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Cannot fit a transform on zero rows")]
    EmptyInput,
    #[error("Schema has no feature columns")]
    NoFeatures,
    #[error("Expected {expected} {block} values, found {found}")]
    WidthMismatch {
        block: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Numeric scaling failed: {0}")]
    Scaling(#[from] AprenderError),
    #[error("Invalid transform: {0}")]
    Invalid(String),
}

/// Fitted scaler + encoder pair bound to a feature schema.
///
/// The scaler stays unfitted when the schema has no numeric columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preprocessor {
    pub schema: FeatureSchema,
    pub scaler: StandardScaler,
    pub encoder: OneHotEncoder,
}

impl Preprocessor {
    /// Learn scaling statistics and category vocabularies from `rows`.
    pub fn fit(schema: &FeatureSchema, rows: &[FeatureRow]) -> Result<Self, PreprocessError> {
        if rows.is_empty() {
            return Err(PreprocessError::EmptyInput);
        }
        if schema.is_empty() {
            return Err(PreprocessError::NoFeatures);
        }
        let mut scaler = StandardScaler::new();
        if !schema.numeric.is_empty() {
            scaler.fit(&numeric_matrix(rows, schema.numeric.len())?)?;
        }
        let categorical: Vec<&[String]> =
            rows.iter().map(|row| row.categorical.as_slice()).collect();
        let encoder = OneHotEncoder::fit(&categorical, schema.categorical.len())?;
        Ok(Self {
            schema: schema.clone(),
            scaler,
            encoder,
        })
    }

    /// Check a deserialized transform is consistent with its schema.
    pub fn validate(&self) -> Result<(), PreprocessError> {
        let numeric = self.schema.numeric.len();
        if numeric > 0 {
            if !self.scaler.is_fitted() {
                return Err(PreprocessError::Invalid(
                    "scaler is not fitted".to_string(),
                ));
            }
            let (means, stds) = (self.scaler.mean(), self.scaler.std());
            if means.len() != numeric || stds.len() != numeric {
                return Err(PreprocessError::Invalid(format!(
                    "scaler covers {} columns but the schema has {numeric}",
                    means.len()
                )));
            }
            if means.iter().chain(stds).any(|v| !v.is_finite()) || stds.iter().any(|&s| s < 0.0) {
                return Err(PreprocessError::Invalid(
                    "scaler statistics must be finite with non-negative spread".to_string(),
                ));
            }
        }
        self.encoder.validate(self.schema.categorical.len())
    }

    /// Length of every transformed row.
    pub fn output_width(&self) -> usize {
        self.schema.numeric.len() + self.encoder.width()
    }

    /// Names of the transformed features, in output order.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = self.schema.numeric.clone();
        names.extend(self.encoder.feature_names(&self.schema.categorical));
        names
    }

    pub fn transform_row(&self, row: &FeatureRow) -> Result<Vec<f32>, PreprocessError> {
        Ok(self
            .transform(std::slice::from_ref(row))?
            .as_slice()
            .to_vec())
    }

    /// Transform `rows` into a row-major `rows x output_width` matrix.
    pub fn transform(&self, rows: &[FeatureRow]) -> Result<Matrix<f32>, PreprocessError> {
        let width = self.output_width();
        let n_numeric = self.schema.numeric.len();
        let scaled = if n_numeric > 0 {
            let numeric = numeric_matrix(rows, n_numeric)?;
            self.scaler.transform(&numeric)?.as_slice().to_vec()
        } else {
            Vec::new()
        };

        let mut data = Vec::with_capacity(rows.len() * width);
        for (idx, row) in rows.iter().enumerate() {
            data.extend_from_slice(&scaled[idx * n_numeric..(idx + 1) * n_numeric]);
            self.encoder.transform_into(&row.categorical, &mut data)?;
        }
        Matrix::from_vec(rows.len(), width, data)
            .map_err(|err| PreprocessError::Scaling(AprenderError::from(err)))
    }
}

fn numeric_matrix(rows: &[FeatureRow], width: usize) -> Result<Matrix<f32>, PreprocessError> {
    let mut data = Vec::with_capacity(rows.len() * width);
    for row in rows {
        if row.numeric.len() != width {
            return Err(PreprocessError::WidthMismatch {
                block: "numeric",
                expected: width,
                found: row.numeric.len(),
            });
        }
        data.extend(row.numeric.iter().map(|&value| value as f32));
    }
    Matrix::from_vec(rows.len(), width, data)
        .map_err(|err| PreprocessError::Scaling(AprenderError::from(err)))
}
