use super::{DatasetError, FeatureRow, FeatureSchema};

/// A single member's raw attributes, keyed the way the source CSV names them.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberFeatures {
    pub age: f64,
    pub weight_kg: f64,
    pub height_m: f64,
    pub bmi: f64,
    pub gender: String,
    pub fitness_level: String,
}

impl MemberFeatures {
    fn numeric_value(&self, column: &str) -> Option<f64> {
        match column {
            "Age" => Some(self.age),
            "Weight (kg)" => Some(self.weight_kg),
            "Height (m)" => Some(self.height_m),
            "BMI" => Some(self.bmi),
            _ => None,
        }
    }

    fn categorical_value(&self, column: &str) -> Option<&str> {
        match column {
            "Gender" => Some(&self.gender),
            "Fitness_Level" => Some(&self.fitness_level),
            _ => None,
        }
    }

    /// Lay the attributes out in `schema` order.
    pub fn to_row(&self, schema: &FeatureSchema) -> Result<FeatureRow, DatasetError> {
        let unknown = |column: &String| DatasetError::UnknownColumn {
            column: column.clone(),
        };
        let numeric = schema
            .numeric
            .iter()
            .map(|column| self.numeric_value(column).ok_or_else(|| unknown(column)))
            .collect::<Result<Vec<_>, _>>()?;
        let categorical = schema
            .categorical
            .iter()
            .map(|column| {
                self.categorical_value(column)
                    .map(str::to_string)
                    .ok_or_else(|| unknown(column))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FeatureRow {
            numeric,
            categorical,
        })
    }
}
