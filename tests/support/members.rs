use std::fmt::Write as _;
use std::path::Path;

use workout_model::config::TrainingConfig;

pub const WORKOUTS: [&str; 4] = ["Cardio", "HIIT", "Strength", "Yoga"];
const LEVELS: [&str; 3] = ["Beginner", "Intermediate", "Advanced"];

/// Deterministic member records where the workout type follows age band and
/// fitness level, with a few unparseable numeric cells mixed in.
pub fn member_csv(rows: usize, with_height: bool) -> String {
    let mut out = String::new();
    if with_height {
        out.push_str("Age,Gender,Weight (kg),Height (m),Max_BPM,BMI,Fitness_Level,Workout_Type\n");
    } else {
        out.push_str("Age,Gender,Weight (kg),Max_BPM,BMI,Fitness_Level,Workout_Type\n");
    }
    for i in 0..rows {
        let age = 18 + (i * 7) % 45;
        let gender = if i % 2 == 0 { "Male" } else { "Female" };
        let weight = 50.0 + ((i * 13) % 50) as f64;
        let height = 1.55 + ((i * 3) % 40) as f64 / 100.0;
        let bmi = weight / (height * height);
        let level = LEVELS[(i / 3) % 3];
        let workout = WORKOUTS[(age - 18) / 12 % 4];

        let age_cell = if i % 17 == 5 { "unknown".to_string() } else { age.to_string() };
        let bmi_cell = if i % 19 == 7 { String::new() } else { format!("{bmi:.2}") };
        let _ = write!(out, "{age_cell},{gender},{weight:.1},");
        if with_height {
            let _ = write!(out, "{height:.2},");
        }
        let _ = writeln!(out, "{},{bmi_cell},{level},{workout}", 160 + i % 30);
    }
    out
}

pub fn catalog_csv() -> &'static str {
    "Name of Exercise,Sets,Reps,Benefit,Burns Calories (per 30 min),Target Muscle Group,Equipment Needed,Difficulty Level\n\
     Push-ups,3,15,Builds chest,200,Chest,None,Beginner\n\
     Squats,4,12,Builds legs,250,Legs,None,Intermediate\n"
}

/// Write both input files under `dir` and return a config pointing at them.
pub fn write_inputs(dir: &Path, rows: usize, with_height: bool) -> TrainingConfig {
    let members = dir.join("members.csv");
    let exercises = dir.join("exercises.csv");
    std::fs::write(&members, member_csv(rows, with_height)).expect("write members");
    std::fs::write(&exercises, catalog_csv()).expect("write catalog");

    let mut config = TrainingConfig::default();
    config.paths.members_csv = members;
    config.paths.exercises_csv = exercises;
    config.paths.model_out = dir.join("simple_workout_model.json");
    config.forest.n_estimators = 25;
    config
}
