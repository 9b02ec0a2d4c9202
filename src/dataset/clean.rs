//! Numeric coercion and median imputation.
//!
//! Medians are computed over every loaded row, before the holdout split.

use super::{DatasetError, FeatureFrame, FeatureRow, FeatureSchema, MemberTable};

/// How one numeric column was repaired.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnImputation {
    pub column: String,
    pub median: f64,
    /// Cells that failed to parse (or were empty) and took the median.
    pub imputed: usize,
}

/// Outcome of cleaning a member table.
#[derive(Debug, Clone, Default)]
pub struct CleaningSummary {
    pub imputations: Vec<ColumnImputation>,
    /// Declared feature columns absent from the source file.
    pub skipped_columns: Vec<String>,
}

/// Parse each cell as a finite number; anything else becomes `None`.
pub fn coerce_numeric<S: AsRef<str>>(cells: &[S]) -> Vec<Option<f64>> {
    cells
        .iter()
        .map(|cell| {
            cell.as_ref()
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
        })
        .collect()
}

/// Median of the present values; even counts average the middle pair.
pub fn median(values: &[Option<f64>]) -> Option<f64> {
    let mut present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    present.sort_by(f64::total_cmp);
    let mid = present.len() / 2;
    if present.len() % 2 == 0 {
        Some((present[mid - 1] + present[mid]) / 2.0)
    } else {
        Some(present[mid])
    }
}

/// Build the feature frame from declared columns that exist in `table`.
///
/// Numeric columns are coerced and median-imputed; categorical cells are
/// kept verbatim. A missing target column or a blank label is an error,
/// missing feature columns are skipped.
pub fn build_feature_frame(
    table: &MemberTable,
    numeric_columns: &[String],
    categorical_columns: &[String],
    target_column: &str,
) -> Result<(FeatureFrame, CleaningSummary), DatasetError> {
    let label_cells = table
        .column(target_column)
        .ok_or_else(|| DatasetError::MissingTarget {
            column: target_column.to_string(),
        })?;
    // Rows are 1-based data rows, header excluded.
    if let Some(idx) = label_cells.iter().position(|cell| cell.trim().is_empty()) {
        return Err(DatasetError::MissingLabel {
            row: idx + 1,
            column: target_column.to_string(),
        });
    }
    let labels: Vec<String> = label_cells.into_iter().map(str::to_string).collect();

    let mut summary = CleaningSummary::default();
    let mut schema = FeatureSchema {
        numeric: Vec::new(),
        categorical: Vec::new(),
    };

    let mut numeric_values: Vec<Vec<f64>> = Vec::new();
    for column in numeric_columns {
        let Some(cells) = table.column(column) else {
            tracing::debug!("Numeric column `{column}` not present; skipping");
            summary.skipped_columns.push(column.clone());
            continue;
        };
        let coerced = coerce_numeric(&cells);
        let fill = median(&coerced).ok_or_else(|| DatasetError::NoNumericValues {
            column: column.clone(),
        })?;
        let imputed = coerced.iter().filter(|value| value.is_none()).count();
        numeric_values.push(coerced.into_iter().map(|v| v.unwrap_or(fill)).collect());
        summary.imputations.push(ColumnImputation {
            column: column.clone(),
            median: fill,
            imputed,
        });
        schema.numeric.push(column.clone());
    }

    let mut categorical_values: Vec<Vec<&str>> = Vec::new();
    for column in categorical_columns {
        let Some(cells) = table.column(column) else {
            tracing::debug!("Categorical column `{column}` not present; skipping");
            summary.skipped_columns.push(column.clone());
            continue;
        };
        categorical_values.push(cells);
        schema.categorical.push(column.clone());
    }

    let rows = (0..table.n_rows())
        .map(|row_idx| FeatureRow {
            numeric: numeric_values.iter().map(|col| col[row_idx]).collect(),
            categorical: categorical_values
                .iter()
                .map(|col| col[row_idx].to_string())
                .collect(),
        })
        .collect();

    Ok((
        FeatureFrame {
            schema,
            rows,
            labels,
        },
        summary,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn table() -> MemberTable {
        MemberTable {
            headers: strings(&["Age", "BMI", "Gender", "Workout_Type"]),
            rows: vec![
                strings(&["30", "22.5", "Male", "Cardio"]),
                strings(&["abc", "", "Female", "Yoga"]),
                strings(&["40", "24.5", "Female", "HIIT"]),
                strings(&["50", "n/a", "Male", "Strength"]),
            ],
        }
    }

    #[test]
    fn coerce_rejects_garbage_and_non_finite() {
        let out = coerce_numeric(&["1.5", " 2 ", "x", "", "inf", "NaN", "-3e1"]);
        assert_eq!(
            out,
            vec![Some(1.5), Some(2.0), None, None, None, None, Some(-30.0)]
        );
    }

    #[test]
    fn median_handles_odd_even_and_empty() {
        assert_eq!(median(&[Some(3.0), None, Some(1.0), Some(2.0)]), Some(2.0));
        assert_eq!(median(&[Some(4.0), Some(1.0), Some(3.0), Some(2.0)]), Some(2.5));
        assert_eq!(median(&[None, None]), None);
    }

    #[test]
    fn imputes_with_full_column_median() {
        let (frame, summary) = build_feature_frame(
            &table(),
            &strings(&["Age", "Weight (kg)", "BMI"]),
            &strings(&["Gender", "Fitness_Level"]),
            "Workout_Type",
        )
        .unwrap();

        assert_eq!(frame.schema.numeric, strings(&["Age", "BMI"]));
        assert_eq!(frame.schema.categorical, strings(&["Gender"]));
        assert_eq!(summary.skipped_columns, strings(&["Weight (kg)", "Fitness_Level"]));

        assert_eq!(frame.rows[1].numeric, vec![40.0, 23.5]);
        assert_eq!(frame.rows[3].numeric, vec![50.0, 23.5]);
        assert_eq!(frame.rows[1].categorical, strings(&["Female"]));
        assert_eq!(frame.labels, strings(&["Cardio", "Yoga", "HIIT", "Strength"]));

        assert_eq!(summary.imputations[0].imputed, 1);
        assert_eq!(summary.imputations[1].imputed, 2);
        for row in &frame.rows {
            assert!(row.numeric.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn missing_target_is_an_error() {
        let err = build_feature_frame(&table(), &strings(&["Age"]), &[], "Label").unwrap_err();
        assert!(matches!(err, DatasetError::MissingTarget { column } if column == "Label"));
    }

    #[test]
    fn blank_label_is_an_error() {
        let mut table = table();
        table.rows[2][3] = String::new();
        let err = build_feature_frame(&table, &strings(&["Age"]), &[], "Workout_Type").unwrap_err();
        assert!(matches!(
            err,
            DatasetError::MissingLabel { row: 3, ref column } if column == "Workout_Type"
        ));
    }

    #[test]
    fn short_row_leaves_label_blank() {
        let mut table = table();
        table.rows[0].truncate(2);
        let err = build_feature_frame(&table, &strings(&["Age"]), &[], "Workout_Type").unwrap_err();
        assert!(matches!(err, DatasetError::MissingLabel { row: 1, .. }));
    }

    #[test]
    fn all_invalid_numeric_column_is_an_error() {
        let mut table = table();
        for row in &mut table.rows {
            row[0] = "?".to_string();
        }
        let err = build_feature_frame(&table, &strings(&["Age"]), &[], "Workout_Type").unwrap_err();
        assert!(matches!(err, DatasetError::NoNumericValues { .. }));
    }
}
