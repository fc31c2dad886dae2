//! Seeded train/test splitting

use crate::core::{Result, SVMError};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Row indices of the two sides of a split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` with a seeded RNG and cut it into train and test parts.
///
/// The test part holds `round(n * test_ratio)` rows; the same seed always
/// yields the same split.
pub fn train_test_split(n: usize, test_ratio: f64, seed: u64) -> Result<SplitIndices> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(SVMError::InvalidParameter(format!(
            "test ratio must be between 0 and 1, got: {test_ratio}"
        )));
    }
    if n == 0 {
        return Err(SVMError::EmptyDataset);
    }

    let test_size = (n as f64 * test_ratio).round() as usize;
    let train_size = n - test_size;
    if test_size == 0 || train_size == 0 {
        return Err(SVMError::InvalidParameter(format!(
            "test ratio {test_ratio} leaves an empty side when splitting {n} samples"
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test = indices.split_off(train_size);
    Ok(SplitIndices {
        train: indices,
        test,
    })
}

/// Copy the given rows of `x`
pub fn select_rows(x: ArrayView2<f64>, indices: &[usize]) -> Array2<f64> {
    x.select(Axis(0), indices)
}

/// Copy the given entries of `y`
pub fn select_labels(y: ArrayView1<f64>, indices: &[usize]) -> Array1<f64> {
    y.select(Axis(0), indices)
}

/// Pick the given items out of a slice, in index order
pub fn select_items<T: Clone>(items: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| items[i].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_train_test_split_sizes() {
        let split = train_test_split(5, 0.4, 42).unwrap();
        assert_eq!(split.train.len(), 3);
        assert_eq!(split.test.len(), 2);

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_split_is_reproducible() {
        let a = train_test_split(100, 0.25, 7).unwrap();
        let b = train_test_split(100, 0.25, 7).unwrap();
        let c = train_test_split(100, 0.25, 8).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.test.len(), 25);
    }

    #[test]
    fn test_invalid_ratio() {
        for ratio in [0.0, 1.0, -0.2, 1.5, f64::NAN] {
            assert!(matches!(
                train_test_split(10, ratio, 0),
                Err(SVMError::InvalidParameter(_))
            ));
        }
        assert!(matches!(
            train_test_split(0, 0.5, 0),
            Err(SVMError::EmptyDataset)
        ));
        // round(2 * 0.1) = 0 test rows
        assert!(train_test_split(2, 0.1, 0).is_err());
    }

    #[test]
    fn test_select_helpers() {
        let x = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let y = array![1.0, -1.0, 1.0];
        let idx = [2, 0];

        assert_eq!(select_rows(x.view(), &idx), array![[5.0, 6.0], [1.0, 2.0]]);
        assert_eq!(select_labels(y.view(), &idx), array![1.0, 1.0]);
        assert_eq!(select_items(&["a", "b", "c"], &idx), vec!["c", "a"]);
    }
}
