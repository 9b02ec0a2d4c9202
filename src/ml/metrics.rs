//! Evaluation metrics for classification models.

#[derive(Debug, Clone)]
/// Confusion matrix for a `K`-class classifier.
pub struct ConfusionMatrix {
    /// Number of classes.
    pub n_classes: usize,
    /// Row-major `KxK` counts (`truth * K + predicted`).
    pub counts: Vec<u32>,
}

impl ConfusionMatrix {
    /// Create an empty `KxK` confusion matrix.
    pub fn new(n_classes: usize) -> Self {
        Self {
            n_classes,
            counts: vec![0; n_classes * n_classes],
        }
    }

    pub fn add(&mut self, truth: usize, predicted: usize) {
        if truth >= self.n_classes || predicted >= self.n_classes {
            return;
        }
        let idx = truth * self.n_classes + predicted;
        self.counts[idx] = self.counts[idx].saturating_add(1);
    }

    pub fn get(&self, truth: usize, predicted: usize) -> u32 {
        self.counts[truth * self.n_classes + predicted]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&v| v as u64).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Precision/recall statistics for a single class.
pub struct PerClassStats {
    /// `TP / (TP + FP)`.
    pub precision: f32,
    /// `TP / (TP + FN)`.
    pub recall: f32,
    /// Total number of true examples for the class.
    pub support: u32,
}

/// Compute per-class precision and recall from a confusion matrix.
pub fn precision_recall_by_class(cm: &ConfusionMatrix) -> Vec<PerClassStats> {
    let k = cm.n_classes;
    let mut stats = Vec::with_capacity(k);
    for class_idx in 0..k {
        let tp = cm.get(class_idx, class_idx) as f32;
        let mut fp = 0f32;
        let mut fn_ = 0f32;
        let mut support = 0u32;
        for j in 0..k {
            let v = cm.get(class_idx, j);
            support = support.saturating_add(v);
            if j != class_idx {
                fn_ += v as f32;
            }
        }
        for i in 0..k {
            if i != class_idx {
                fp += cm.get(i, class_idx) as f32;
            }
        }
        let precision = if tp + fp == 0.0 { 0.0 } else { tp / (tp + fp) };
        let recall = if tp + fn_ == 0.0 { 0.0 } else { tp / (tp + fn_) };
        stats.push(PerClassStats {
            precision,
            recall,
            support,
        });
    }
    stats
}

/// Mean exact-match rate between two label sequences; `0.0` when empty.
pub fn exact_match_rate<T: PartialEq>(truth: &[T], predicted: &[T]) -> f32 {
    if truth.is_empty() {
        return 0.0;
    }
    let correct = truth
        .iter()
        .zip(predicted)
        .filter(|(t, p)| t == p)
        .count();
    correct as f32 / truth.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_class_stats() {
        let mut cm = ConfusionMatrix::new(3);
        for (truth, predicted) in [(0, 0), (0, 1), (1, 1), (1, 1), (2, 2), (2, 0)] {
            cm.add(truth, predicted);
        }
        assert_eq!(cm.total(), 6);

        let stats = precision_recall_by_class(&cm);
        assert_eq!(stats[0].support, 2);
        assert!((stats[0].precision - 0.5).abs() < 1e-6);
        assert!((stats[0].recall - 0.5).abs() < 1e-6);
        assert!((stats[1].precision - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(stats[1].recall, 1.0);
        assert_eq!(stats[2].precision, 1.0);
    }

    #[test]
    fn out_of_range_indices_are_ignored() {
        let mut cm = ConfusionMatrix::new(2);
        cm.add(0, 5);
        cm.add(3, 0);
        assert_eq!(cm.total(), 0);
    }

    #[test]
    fn exact_match_rate_bounds() {
        assert_eq!(exact_match_rate::<u8>(&[], &[]), 0.0);
        assert_eq!(exact_match_rate(&["a", "b"], &["a", "b"]), 1.0);
        assert_eq!(exact_match_rate(&["a", "b"], &["b", "a"]), 0.0);
        assert_eq!(exact_match_rate(&["a", "b", "c", "d"], &["a", "x", "c", "x"]), 0.5);
    }
}
