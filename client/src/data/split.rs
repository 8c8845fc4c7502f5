use std::collections::BTreeMap;

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::error::DataErr;

/// Parameters of the train/validation split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitConfig {
    /// Fraction of rows held out for validation.
    pub test_size: f64,
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_size: 0.3,
            seed: 42,
        }
    }
}

/// Splits row indices into a training and a validation set preserving the
/// label proportions.
///
/// The validation set holds `ceil(test_size * n)` rows. Training rows are
/// allocated to each class proportionally to its size, the rows left over by
/// rounding go to the classes with the largest remainders. Both index sets
/// are shuffled with a generator seeded by `cfg.seed`, so the split is the
/// same on every run.
///
/// Classes are told apart by the bits of their label, so `labels` must be
/// coerced first (no NaN, no `-0`). `DataPartition` does so before splitting.
///
/// # Returns
/// The training and the validation row indices.
pub fn stratified_split(
    labels: &[f32],
    cfg: SplitConfig,
) -> Result<(Vec<usize>, Vec<usize>), DataErr> {
    let n = labels.len();
    let n_test = (cfg.test_size * n as f64).ceil() as usize;

    if n_test == 0 || n_test >= n {
        return Err(DataErr::SplitTooSmall {
            rows: n,
            test_size: cfg.test_size,
        });
    }

    let n_train = n - n_test;

    // Coerced labels are non-negative, so bit order is ascending label order.
    let mut classes: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (row, label) in labels.iter().enumerate() {
        classes.entry(label.to_bits()).or_default().push(row);
    }

    let mut alloc: Vec<usize> = classes
        .values()
        .map(|rows| rows.len() * n_train / n)
        .collect();

    let mut remainders: Vec<(usize, usize)> = classes
        .values()
        .map(|rows| rows.len() * n_train % n)
        .enumerate()
        .collect();
    remainders.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let missing = n_train - alloc.iter().sum::<usize>();
    for &(class, _) in remainders.iter().take(missing) {
        alloc[class] += 1;
    }

    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let mut train = Vec::with_capacity(n_train);
    let mut valid = Vec::with_capacity(n_test);

    for (mut rows, take) in classes.into_values().zip(alloc) {
        rows.shuffle(&mut rng);
        let held_out = rows.split_off(take);
        train.extend(rows);
        valid.extend(held_out);
    }

    train.shuffle(&mut rng);
    valid.shuffle(&mut rng);

    Ok((train, valid))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(benign: usize, attack: usize) -> Vec<f32> {
        let mut labels = vec![0.0; benign];
        labels.extend(vec![1.0; attack]);
        labels
    }

    fn count(rows: &[usize], labels: &[f32], class: f32) -> usize {
        rows.iter().filter(|&&row| labels[row] == class).count()
    }

    #[test]
    fn seventy_thirty_keeps_proportions() {
        let labels = labels(1000, 500);
        let (train, valid) = stratified_split(&labels, SplitConfig::default()).unwrap();

        assert_eq!(train.len(), 1050);
        assert_eq!(valid.len(), 450);
        assert_eq!(count(&train, &labels, 0.0), 700);
        assert_eq!(count(&train, &labels, 1.0), 350);
    }

    #[test]
    fn sets_are_disjoint_and_cover_every_row() {
        let labels = labels(37, 11);
        let (train, valid) = stratified_split(&labels, SplitConfig::default()).unwrap();

        let mut all: Vec<_> = train.iter().chain(&valid).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..labels.len()).collect::<Vec<_>>());
        assert_eq!(valid.len(), 15);
    }

    #[test]
    fn same_seed_same_split() {
        let labels = labels(50, 50);
        let a = stratified_split(&labels, SplitConfig::default()).unwrap();
        let b = stratified_split(&labels, SplitConfig::default()).unwrap();
        assert_eq!(a, b);

        let c = stratified_split(
            &labels,
            SplitConfig {
                seed: 7,
                ..SplitConfig::default()
            },
        )
        .unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn remainders_go_to_the_largest_fractions() {
        // n = 10, 3 test rows, 7 train rows: 5 * 7 / 10 = 3.5, 3 * 7 / 10 = 2.1,
        // 2 * 7 / 10 = 1.4, the leftover row goes to the first class.
        let labels = [0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 2.0];
        let (train, _) = stratified_split(&labels, SplitConfig::default()).unwrap();

        assert_eq!(count(&train, &labels, 0.0), 4);
        assert_eq!(count(&train, &labels, 1.0), 2);
        assert_eq!(count(&train, &labels, 2.0), 1);
    }

    #[test]
    fn too_few_rows_cannot_be_split() {
        assert!(matches!(
            stratified_split(&[1.0], SplitConfig::default()),
            Err(DataErr::SplitTooSmall { rows: 1, .. })
        ));
    }
}
