use std::path::PathBuf;

/// Member records consumed by the training run.
pub const DEFAULT_MEMBERS_CSV: &str = "gym_members_exercise_tracking.csv";
/// Auxiliary exercise catalog loaded alongside the member records.
pub const DEFAULT_EXERCISES_CSV: &str = "Top 50 Excerice for your body.csv";
/// Output artifact path.
pub const DEFAULT_MODEL_PATH: &str = "simple_workout_model.json";
/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "workout_model.toml";

pub(super) fn default_members_csv() -> PathBuf {
    PathBuf::from(DEFAULT_MEMBERS_CSV)
}

pub(super) fn default_exercises_csv() -> PathBuf {
    PathBuf::from(DEFAULT_EXERCISES_CSV)
}

pub(super) fn default_model_path() -> PathBuf {
    PathBuf::from(DEFAULT_MODEL_PATH)
}

pub(super) fn default_numeric_columns() -> Vec<String> {
    ["Age", "Weight (kg)", "Height (m)", "BMI"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

pub(super) fn default_categorical_columns() -> Vec<String> {
    ["Gender", "Fitness_Level"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

pub(super) fn default_target_column() -> String {
    "Workout_Type".to_string()
}

pub(super) fn default_test_fraction() -> f64 {
    0.2
}

pub(super) fn default_seed() -> u64 {
    42
}

pub(super) fn default_n_estimators() -> usize {
    100
}
