//! End-to-end training run: load, clean, split, fit, evaluate, persist, and
//! one smoke prediction.
//!
//! Any failure aborts the run; nothing is retried.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::{ConfigError, TrainingConfig};
use crate::dataset::{
    CleaningSummary, DatasetError, build_feature_frame, load_exercise_catalog, load_members,
    train_test_split,
};
use crate::ml::metrics::{ConfusionMatrix, PerClassStats, precision_recall_by_class};
use crate::pipeline::{PipelineError, WorkoutPipeline, artifact_fingerprint};

#[derive(Debug, Error)]
pub enum TrainError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Everything a training run measured and produced.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub n_rows: usize,
    pub n_train: usize,
    pub n_test: usize,
    pub catalog_rows: usize,
    pub cleaning: CleaningSummary,
    pub feature_names: Vec<String>,
    pub classes: Vec<String>,
    pub train_accuracy: f32,
    pub test_accuracy: f32,
    pub test_confusion: ConfusionMatrix,
    pub test_per_class: Vec<PerClassStats>,
    /// Out-of-bag accuracy on the training rows, when the forest has one.
    pub oob_accuracy: Option<f32>,
    /// Transformed features ranked by importance, highest first.
    pub feature_importances: Vec<(String, f32)>,
    pub model_path: PathBuf,
    /// BLAKE3 digest of the written artifact.
    pub fingerprint: String,
    /// Prediction for the first held-out row.
    pub sample_prediction: String,
}

/// Run the full training sequence described by `config`.
pub fn train_simple_model(
    config: &TrainingConfig,
) -> Result<(WorkoutPipeline, TrainingReport), TrainError> {
    config.validate()?;

    tracing::info!("Loading data...");
    let members = load_members(&config.paths.members_csv)?;
    let catalog = load_exercise_catalog(&config.paths.exercises_csv)?;
    tracing::info!(
        "Loaded {} member records and {} catalog exercises",
        members.n_rows(),
        catalog.n_rows
    );

    tracing::info!("Preprocessing data...");
    let (frame, cleaning) = build_feature_frame(
        &members,
        &config.columns.numeric,
        &config.columns.categorical,
        &config.columns.target,
    )?;
    for imputation in cleaning.imputations.iter().filter(|i| i.imputed > 0) {
        tracing::info!(
            "Imputed {} value(s) in `{}` with median {}",
            imputation.imputed,
            imputation.column,
            imputation.median
        );
    }
    if !cleaning.skipped_columns.is_empty() {
        tracing::warn!(
            "Columns not found and skipped: {}",
            cleaning.skipped_columns.join(", ")
        );
    }

    let split = train_test_split(frame.len(), config.split.test_fraction, config.split.seed)?;
    let train = frame.select(&split.train);
    let test = frame.select(&split.test);

    tracing::info!(
        "Training model on {} rows ({} trees)...",
        train.len(),
        config.forest.n_estimators
    );
    let pipeline = WorkoutPipeline::fit(&train, &config.forest.forest_options())?;

    let train_accuracy = pipeline.score(&train)?;
    let test_accuracy = pipeline.score(&test)?;
    let test_confusion = pipeline.confusion_matrix(&test)?;
    let test_per_class = precision_recall_by_class(&test_confusion);
    let oob_accuracy = pipeline.oob_accuracy();
    if let Some(oob) = oob_accuracy {
        tracing::debug!("Out-of-bag accuracy {oob:.4}");
    }

    let model_path = config.paths.model_out.clone();
    let bytes = pipeline.save_json(&model_path)?;
    let fingerprint = artifact_fingerprint(&bytes);
    tracing::info!(
        "Model saved to {} ({} bytes, blake3 {})",
        model_path.display(),
        bytes.len(),
        fingerprint
    );

    let sample_prediction = pipeline.predict_row(&test.rows[0])?.to_string();

    let report = TrainingReport {
        n_rows: frame.len(),
        n_train: train.len(),
        n_test: test.len(),
        catalog_rows: catalog.n_rows,
        cleaning,
        feature_names: pipeline.preprocessor.feature_names(),
        classes: pipeline.classes.clone(),
        train_accuracy,
        test_accuracy,
        test_confusion,
        test_per_class,
        oob_accuracy,
        feature_importances: pipeline.feature_importances(),
        model_path,
        fingerprint,
        sample_prediction,
    };
    Ok((pipeline, report))
}
