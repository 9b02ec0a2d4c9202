//! Fitted preprocessing + random forest, persisted as one JSON document.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use aprender::primitives::Matrix;
use aprender::tree::RandomForestClassifier;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dataset::{DatasetError, FeatureFrame, FeatureRow, MemberFeatures};
use crate::ml::forest::{
    ForestError, ForestOptions, argmax, class_votes, fit_forest, fitted_width,
};
use crate::ml::metrics::{ConfusionMatrix, exact_match_rate};
use crate::preprocess::{PreprocessError, Preprocessor};

/// Artifact layout version written to `format_version`.
pub const PIPELINE_FORMAT_VERSION: i64 = 1;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Cannot fit a pipeline on an empty frame")]
    EmptyFrame,
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Preprocess(#[from] PreprocessError),
    #[error(transparent)]
    Forest(#[from] ForestError),
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid model JSON at {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to serialize model: {0}")]
    Serialize(serde_json::Error),
    #[error("Invalid model: {0}")]
    Invalid(String),
}

/// Preprocessor and classifier fitted together; immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutPipeline {
    pub format_version: i64,
    pub preprocessor: Preprocessor,
    /// Sorted workout types seen during fitting; forest outputs index into it.
    pub classes: Vec<String>,
    pub forest: RandomForestClassifier,
}

impl WorkoutPipeline {
    /// Fit the transform on `frame`, then the forest on the transformed rows.
    pub fn fit(frame: &FeatureFrame, options: &ForestOptions) -> Result<Self, PipelineError> {
        if frame.is_empty() {
            return Err(PipelineError::EmptyFrame);
        }
        let preprocessor = Preprocessor::fit(&frame.schema, &frame.rows)?;
        let x = preprocessor.transform(&frame.rows)?;

        let classes: Vec<String> = frame
            .labels
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let y: Vec<usize> = frame
            .labels
            .iter()
            .map(|label| classes.binary_search(label).unwrap_or_default())
            .collect();

        let forest = fit_forest(&x, &y, classes.len(), options)?;
        tracing::debug!(
            "Fitted {} trees over {} features and {} classes",
            options.n_estimators,
            preprocessor.output_width(),
            classes.len()
        );
        Ok(Self {
            format_version: PIPELINE_FORMAT_VERSION,
            preprocessor,
            classes,
            forest,
        })
    }

    /// Validate structural invariants of the pipeline.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.format_version != PIPELINE_FORMAT_VERSION {
            return Err(PipelineError::Invalid(format!(
                "Unsupported format_version {} (expected {PIPELINE_FORMAT_VERSION})",
                self.format_version
            )));
        }
        self.preprocessor.validate()?;
        if self.classes.is_empty() || self.classes.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(PipelineError::Invalid(
                "class names must be non-empty, sorted and unique".to_string(),
            ));
        }
        let width = self.preprocessor.output_width();
        let Some(forest_width) = fitted_width(&self.forest) else {
            return Err(PipelineError::Invalid("forest is not fitted".to_string()));
        };
        if forest_width != width {
            return Err(PipelineError::Invalid(format!(
                "Transform yields {width} features but the forest expects {forest_width}"
            )));
        }
        let zero_row = Matrix::from_vec(1, width, vec![0.0; width])
            .map_err(|err| PipelineError::Invalid(err.to_string()))?;
        let n_votes = class_votes(&self.forest, &zero_row)?
            .first()
            .map_or(0, Vec::len);
        if n_votes != self.classes.len() {
            return Err(PipelineError::Invalid(format!(
                "{} class names for a {n_votes}-class forest",
                self.classes.len()
            )));
        }
        Ok(())
    }

    /// Class index per row.
    pub fn predict_indices(&self, rows: &[FeatureRow]) -> Result<Vec<usize>, PipelineError> {
        let x = self.preprocessor.transform(rows)?;
        Ok(class_votes(&self.forest, &x)?
            .iter()
            .map(|votes| argmax(votes))
            .collect())
    }

    pub fn predict(&self, rows: &[FeatureRow]) -> Result<Vec<String>, PipelineError> {
        Ok(self
            .predict_indices(rows)?
            .into_iter()
            .map(|idx| self.classes[idx].clone())
            .collect())
    }

    pub fn predict_row(&self, row: &FeatureRow) -> Result<&str, PipelineError> {
        let idx = self.predict_indices(std::slice::from_ref(row))?[0];
        Ok(&self.classes[idx])
    }

    /// Recommend a workout type for one member.
    pub fn predict_member(&self, member: &MemberFeatures) -> Result<String, PipelineError> {
        let row = member.to_row(&self.preprocessor.schema)?;
        Ok(self.predict_row(&row)?.to_string())
    }

    /// Mean exact-match accuracy against `frame.labels`, in `[0, 1]`.
    pub fn score(&self, frame: &FeatureFrame) -> Result<f32, PipelineError> {
        let predicted = self.predict(&frame.rows)?;
        Ok(exact_match_rate(&frame.labels, &predicted))
    }

    /// Confusion matrix over `frame`; rows whose label was never seen during
    /// fitting are left out.
    pub fn confusion_matrix(&self, frame: &FeatureFrame) -> Result<ConfusionMatrix, PipelineError> {
        let predicted = self.predict_indices(&frame.rows)?;
        let mut cm = ConfusionMatrix::new(self.classes.len());
        for (label, pred) in frame.labels.iter().zip(predicted) {
            if let Ok(truth) = self.classes.binary_search(label) {
                cm.add(truth, pred);
            }
        }
        Ok(cm)
    }

    /// Impurity-based importance per transformed feature, highest first.
    pub fn feature_importances(&self) -> Vec<(String, f32)> {
        let mut ranked: Vec<(String, f32)> = self
            .preprocessor
            .feature_names()
            .into_iter()
            .zip(self.forest.feature_importances().unwrap_or_default())
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    /// Out-of-bag accuracy on the training rows.
    pub fn oob_accuracy(&self) -> Option<f32> {
        self.forest.oob_score()
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>, PipelineError> {
        serde_json::to_vec_pretty(self).map_err(PipelineError::Serialize)
    }

    /// Write the pipeline to `path`, replacing any existing file.
    ///
    /// Returns the bytes written.
    pub fn save_json(&self, path: &Path) -> Result<Vec<u8>, PipelineError> {
        let write_error = |source: std::io::Error| PipelineError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        let bytes = self.to_json_bytes()?;
        std::fs::write(path, &bytes).map_err(write_error)?;
        Ok(bytes)
    }

    /// Load and validate a pipeline written by [`save_json`](Self::save_json).
    ///
    /// Trees nest one JSON object per level, so the parser's depth limit is
    /// lifted for unpruned forests.
    pub fn load_json(path: &Path) -> Result<Self, PipelineError> {
        let bytes = std::fs::read(path).map_err(|source| PipelineError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let json_error = |source: serde_json::Error| PipelineError::Json {
            path: path.to_path_buf(),
            source,
        };
        let mut de = serde_json::Deserializer::from_slice(&bytes);
        de.disable_recursion_limit();
        let pipeline = Self::deserialize(&mut de).map_err(json_error)?;
        de.end().map_err(json_error)?;
        pipeline.validate()?;
        Ok(pipeline)
    }
}

/// BLAKE3 hex digest of a serialized artifact.
pub fn artifact_fingerprint(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}
