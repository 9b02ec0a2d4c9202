//! Member record loading, cleaning, and holdout splitting.

pub mod clean;
pub mod frame;
pub mod loader;
pub mod member;
pub mod split;

use std::path::PathBuf;

use thiserror::Error;

pub use clean::{CleaningSummary, ColumnImputation, build_feature_frame, coerce_numeric, median};
pub use frame::{FeatureFrame, FeatureRow, FeatureSchema};
pub use loader::{ExerciseCatalog, MemberTable, load_exercise_catalog, load_members};
pub use member::MemberFeatures;
pub use split::{SplitIndices, train_test_split};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read CSV {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
    #[error("CSV {path} has no header row")]
    MissingHeader { path: PathBuf },
    #[error("Target column `{column}` not found")]
    MissingTarget { column: String },
    #[error("Data row {row} has an empty `{column}` label")]
    MissingLabel { row: usize, column: String },
    #[error("Column `{column}` has no numeric values to compute a median from")]
    NoNumericValues { column: String },
    #[error("Column `{column}` is not part of the feature schema")]
    UnknownColumn { column: String },
    #[error("Need at least {required} rows to split, found {found}")]
    TooFewRows { required: usize, found: usize },
    #[error("Invalid test fraction {0}")]
    InvalidFraction(f64),
}
