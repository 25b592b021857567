//! Stratified train/test partition.

/// Row indices of each side of a split, in ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Number of test rows for a class of `n` rows.
///
/// `round(n * test_size)` clamped so both sides get at least one row.
/// Classes with fewer than two rows go entirely to training.
pub fn test_count(n: usize, test_size: f64) -> usize {
    if n < 2 {
        return 0;
    }
    let wanted = (n as f64 * test_size).round() as usize;
    wanted.clamp(1, n - 1)
}

/// Split rows so each class keeps its proportion on both sides.
///
/// Deterministic for a given `seed`.
pub fn stratified_split(labels: &[usize], n_classes: usize, test_size: f64, seed: u64) -> SplitIndices {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();

    for class in 0..n_classes {
        let mut members: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|&(_, &label)| label == class)
            .map(|(i, _)| i)
            .collect();
        rng.shuffle(&mut members);

        let n_test = test_count(members.len(), test_size);
        test.extend_from_slice(&members[..n_test]);
        train.extend_from_slice(&members[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    SplitIndices { train, test }
}
