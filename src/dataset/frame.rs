use serde::{Deserialize, Serialize};

/// Ordered feature columns: numeric block first, then categorical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

/// One member's cleaned feature values, aligned with a [`FeatureSchema`].
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub numeric: Vec<f64>,
    pub categorical: Vec<String>,
}

/// Cleaned feature rows plus their target labels.
#[derive(Debug, Clone)]
pub struct FeatureFrame {
    pub schema: FeatureSchema,
    pub rows: Vec<FeatureRow>,
    pub labels: Vec<String>,
}

impl FeatureSchema {
    pub fn len(&self) -> usize {
        self.numeric.len() + self.categorical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FeatureFrame {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Copy out the rows at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> FeatureFrame {
        FeatureFrame {
            schema: self.schema.clone(),
            rows: indices.iter().map(|&idx| self.rows[idx].clone()).collect(),
            labels: indices.iter().map(|&idx| self.labels[idx].clone()).collect(),
        }
    }
}
