//! Deterministic train/test partitioning

use crate::encode::FeatureMatrix;
use crate::error::PipelineError;
use ndarray::Axis;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Split a feature matrix into train and test partitions.
///
/// Row indices are permuted with a ChaCha8 generator seeded from `seed`;
/// the first `round(n * (1 - test_fraction))` permuted indices form the
/// training partition and the remainder the test partition. ChaCha8 is
/// used deliberately: the partition must be identical for the same
/// `(n, test_fraction, seed)` across processes and platforms, and `StdRng`
/// makes no such portability promise.
///
/// The split is not stratified by label, so class balance across the two
/// partitions is not guaranteed. This mirrors the source pipeline and is a
/// documented limitation, not a defect.
pub fn split(
    matrix: &FeatureMatrix,
    test_fraction: f64,
    seed: u64,
) -> crate::Result<(FeatureMatrix, FeatureMatrix)> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(PipelineError::Config(format!(
            "test_fraction must be in (0, 1), got {}",
            test_fraction
        ))
        .into());
    }

    let n = matrix.n_rows();
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train_len = (n as f64 * (1.0 - test_fraction)).round() as usize;
    let (train_idx, test_idx) = indices.split_at(train_len);

    Ok((take_rows(matrix, train_idx), take_rows(matrix, test_idx)))
}

fn take_rows(matrix: &FeatureMatrix, indices: &[usize]) -> FeatureMatrix {
    FeatureMatrix {
        features: matrix.features.select(Axis(0), indices),
        labels: matrix.labels.select(Axis(0), indices),
    }
}
