use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::DatasetError;

/// Row indices for the two holdout subsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n_rows` with a seeded RNG and hold out `ceil(n * fraction)`
/// rows for testing.
///
/// The first `n_test` shuffled indices form the test subset. Both subsets
/// are guaranteed non-empty.
pub fn train_test_split(
    n_rows: usize,
    test_fraction: f64,
    seed: u64,
) -> Result<SplitIndices, DatasetError> {
    if !(test_fraction.is_finite() && test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(DatasetError::InvalidFraction(test_fraction));
    }
    if n_rows < 2 {
        return Err(DatasetError::TooFewRows {
            required: 2,
            found: n_rows,
        });
    }
    let n_test = ((n_rows as f64) * test_fraction).ceil() as usize;
    let n_test = n_test.clamp(1, n_rows - 1);

    let mut indices: Vec<usize> = (0..n_rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    let train = indices.split_off(n_test);
    Ok(SplitIndices {
        train,
        test: indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_follow_ceil_of_fraction() {
        let split = train_test_split(11, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 3);
        assert_eq!(split.train.len(), 8);

        let split = train_test_split(2, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 1);
        assert_eq!(split.train.len(), 1);
    }

    #[test]
    fn subsets_partition_all_rows() {
        let split = train_test_split(50, 0.2, 7).unwrap();
        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn same_seed_same_split() {
        let a = train_test_split(100, 0.2, 42).unwrap();
        let b = train_test_split(100, 0.2, 42).unwrap();
        let c = train_test_split(100, 0.2, 43).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn rejects_degenerate_inputs() {
        assert!(matches!(
            train_test_split(1, 0.2, 42),
            Err(DatasetError::TooFewRows { found: 1, .. })
        ));
        assert!(matches!(
            train_test_split(10, 0.0, 42),
            Err(DatasetError::InvalidFraction(_))
        ));
        assert!(matches!(
            train_test_split(10, 1.0, 42),
            Err(DatasetError::InvalidFraction(_))
        ));
    }
}
