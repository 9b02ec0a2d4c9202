//! Workout-type classifier training library.
/// Training run configuration.
pub mod config;
/// Member record loading and cleaning.
pub mod dataset;
/// Tracing subscriber setup.
pub mod logging;
/// Random forest fitting and evaluation metrics.
pub mod ml;
/// Fitted preprocessing + classifier artifact.
pub mod pipeline;
/// Column-wise feature transforms.
pub mod preprocess;
/// End-to-end training run.
pub mod training;
