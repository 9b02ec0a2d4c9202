use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::PreprocessError;

/// One-hot encoder over per-column sorted vocabularies.
///
/// Categories not seen during fitting encode as an all-zero block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    pub vocabularies: Vec<Vec<String>>,
}

impl OneHotEncoder {
    pub fn fit(rows: &[&[String]], n_columns: usize) -> Result<Self, PreprocessError> {
        if rows.is_empty() {
            return Err(PreprocessError::EmptyInput);
        }
        let mut seen: Vec<BTreeSet<&str>> = vec![BTreeSet::new(); n_columns];
        for row in rows {
            check_width(row.len(), n_columns)?;
            for (set, value) in seen.iter_mut().zip(row.iter()) {
                set.insert(value.as_str());
            }
        }
        let vocabularies = seen
            .into_iter()
            .map(|set| set.into_iter().map(str::to_string).collect())
            .collect();
        Ok(Self { vocabularies })
    }

    /// Vocabularies must match the column count and be strictly sorted, since
    /// encoding looks categories up by binary search.
    pub fn validate(&self, n_columns: usize) -> Result<(), PreprocessError> {
        if self.vocabularies.len() != n_columns {
            return Err(PreprocessError::Invalid(format!(
                "encoder has {} vocabularies but the schema has {n_columns} categorical columns",
                self.vocabularies.len()
            )));
        }
        if let Some(idx) = self
            .vocabularies
            .iter()
            .position(|vocab| vocab.windows(2).any(|pair| pair[0] >= pair[1]))
        {
            return Err(PreprocessError::Invalid(format!(
                "vocabulary {idx} is not strictly sorted"
            )));
        }
        Ok(())
    }

    /// Total number of indicator outputs.
    pub fn width(&self) -> usize {
        self.vocabularies.iter().map(Vec::len).sum()
    }

    /// `column=category` names for every indicator, in output order.
    pub fn feature_names(&self, columns: &[String]) -> Vec<String> {
        columns
            .iter()
            .zip(&self.vocabularies)
            .flat_map(|(column, vocab)| vocab.iter().map(move |cat| format!("{column}={cat}")))
            .collect()
    }

    /// Append the indicator blocks for `row` to `out`.
    pub fn transform_into(&self, row: &[String], out: &mut Vec<f32>) -> Result<(), PreprocessError> {
        check_width(row.len(), self.vocabularies.len())?;
        for (value, vocab) in row.iter().zip(&self.vocabularies) {
            let hit = vocab.binary_search_by(|cat| cat.as_str().cmp(value.as_str())).ok();
            out.extend((0..vocab.len()).map(|idx| if Some(idx) == hit { 1.0 } else { 0.0 }));
        }
        Ok(())
    }
}

fn check_width(found: usize, expected: usize) -> Result<(), PreprocessError> {
    if found != expected {
        return Err(PreprocessError::WidthMismatch {
            block: "categorical",
            expected,
            found,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn fitted() -> OneHotEncoder {
        let data = [
            row(&["Male", "Beginner"]),
            row(&["Female", "Advanced"]),
            row(&["Male", "Intermediate"]),
        ];
        let rows: Vec<&[String]> = data.iter().map(Vec::as_slice).collect();
        OneHotEncoder::fit(&rows, 2).unwrap()
    }

    #[test]
    fn vocabulary_is_sorted_and_deduplicated() {
        let encoder = fitted();
        assert_eq!(encoder.vocabularies[0], row(&["Female", "Male"]));
        assert_eq!(
            encoder.vocabularies[1],
            row(&["Advanced", "Beginner", "Intermediate"])
        );
        assert_eq!(encoder.width(), 5);
        assert_eq!(
            encoder.feature_names(&row(&["Gender", "Fitness_Level"]))[1],
            "Gender=Male"
        );
    }

    #[test]
    fn encodes_known_categories() {
        let mut out = Vec::new();
        fitted()
            .transform_into(&row(&["Male", "Intermediate"]), &mut out)
            .unwrap();
        assert_eq!(out, vec![0.0, 1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn validate_requires_sorted_unique_vocabularies() {
        let mut encoder = fitted();
        encoder.validate(2).unwrap();
        assert!(matches!(encoder.validate(3), Err(PreprocessError::Invalid(_))));

        encoder.vocabularies[1] = row(&["Beginner", "Advanced"]);
        assert!(matches!(encoder.validate(2), Err(PreprocessError::Invalid(_))));
        encoder.vocabularies[1] = row(&["Advanced", "Advanced"]);
        assert!(matches!(encoder.validate(2), Err(PreprocessError::Invalid(_))));
    }

    #[test]
    fn unseen_category_is_all_zero() {
        let mut out = Vec::new();
        fitted()
            .transform_into(&row(&["Other", "Beginner"]), &mut out)
            .unwrap();
        assert_eq!(out, vec![0.0, 0.0, 0.0, 1.0, 0.0]);
    }
}
