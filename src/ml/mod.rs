//! Classifier fitting and evaluation metrics.

pub mod forest;
pub mod metrics;
