//! Trains the workout-type classifier and writes the fitted pipeline.

use std::path::PathBuf;

use workout_model::config::TrainingConfig;
use workout_model::logging;
use workout_model::training::{TrainingReport, train_simple_model};

/// Feature importances listed in the report.
const TOP_FEATURES: usize = 5;

fn main() {
    if let Err(err) = run() {
        tracing::error!("Training failed: {err}");
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    let mut config =
        TrainingConfig::load_or_default(options.config.as_deref()).map_err(|err| err.to_string())?;
    options.apply(&mut config);

    let log_path = logging::run_log_path(&config.paths.model_out);
    let _log_guard = match logging::init(&log_path) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("Logging disabled: {err}");
            None
        }
    };

    let (_pipeline, report) = train_simple_model(&config).map_err(|err| err.to_string())?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &TrainingReport) {
    println!("Training score: {:.4}", report.train_accuracy);
    println!("Test score: {:.4}", report.test_accuracy);
    println!();
    println!(
        "rows: {} (train {}, test {}), features: {}",
        report.n_rows,
        report.n_train,
        report.n_test,
        report.feature_names.len()
    );
    for (idx, stats) in report.test_per_class.iter().enumerate() {
        println!(
            "class {:>2} {:<16}  precision={:.3}  recall={:.3}  support={}",
            idx, report.classes[idx], stats.precision, stats.recall, stats.support
        );
    }
    if let Some(oob) = report.oob_accuracy {
        println!("out-of-bag accuracy: {oob:.4}");
    }
    println!("top features:");
    for (name, importance) in report.feature_importances.iter().take(TOP_FEATURES) {
        println!("  {name:<24} {importance:.4}");
    }
    println!("confusion matrix (rows=true, cols=pred):");
    let cm = &report.test_confusion;
    for truth in 0..cm.n_classes {
        let mut row = String::new();
        for pred in 0..cm.n_classes {
            row.push_str(&format!("{:6}", cm.get(truth, pred)));
        }
        println!("{row}");
    }
    println!();
    println!("Model saved to {}", report.model_path.display());
    println!("blake3: {}", report.fingerprint);
    println!();
    println!("Testing prediction with first sample...");
    println!("Predicted workout type: {}", report.sample_prediction);
}

#[derive(Debug, Clone, Default, PartialEq)]
struct CliOptions {
    config: Option<PathBuf>,
    members: Option<PathBuf>,
    exercises: Option<PathBuf>,
    model_out: Option<PathBuf>,
    trees: Option<usize>,
    seed: Option<u64>,
}

impl CliOptions {
    /// Flags win over config file values.
    fn apply(&self, config: &mut TrainingConfig) {
        if let Some(path) = &self.members {
            config.paths.members_csv = path.clone();
        }
        if let Some(path) = &self.exercises {
            config.paths.exercises_csv = path.clone();
        }
        if let Some(path) = &self.model_out {
            config.paths.model_out = path.clone();
        }
        if let Some(trees) = self.trees {
            config.forest.n_estimators = trees;
        }
        if let Some(seed) = self.seed {
            config.split.seed = seed;
            config.forest.seed = seed;
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut idx = 0usize;
    while idx < args.len() {
        let flag = args[idx].as_str();
        if matches!(flag, "-h" | "--help") {
            return Err(help_text());
        }
        idx += 1;
        let value = args
            .get(idx)
            .ok_or_else(|| format!("{flag} requires a value"))
            .cloned();
        match flag {
            "--config" => options.config = Some(PathBuf::from(value?)),
            "--members" => options.members = Some(PathBuf::from(value?)),
            "--exercises" => options.exercises = Some(PathBuf::from(value?)),
            "--out" => options.model_out = Some(PathBuf::from(value?)),
            "--trees" => {
                let value = value?;
                options.trees = Some(
                    value
                        .parse::<usize>()
                        .map_err(|_| format!("Invalid --trees value: {value}"))?,
                );
            }
            "--seed" => {
                let value = value?;
                options.seed = Some(
                    value
                        .parse::<u64>()
                        .map_err(|_| format!("Invalid --seed value: {value}"))?,
                );
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }
    Ok(options)
}

fn help_text() -> String {
    [
        "workout-train",
        "",
        "Trains a random forest that recommends a workout type from member attributes.",
        "",
        "Usage:",
        "  workout-train [options]",
        "",
        "Options:",
        "  --config <file>     TOML config (default: ./workout_model.toml when present).",
        "  --members <csv>     Member records (default: gym_members_exercise_tracking.csv).",
        "  --exercises <csv>   Exercise catalog (default: Top 50 Excerice for your body.csv).",
        "  --out <file>        Output model path (default: simple_workout_model.json).",
        "  --trees <n>         Number of trees (default: 100).",
        "  --seed <n>          Seed for the split and the forest (default: 42).",
    ]
    .join("\n")
}
