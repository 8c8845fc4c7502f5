use boosting::Dataset;
use log::info;

use super::{
    loader::{Table, load_csv},
    sources::DataSources,
    split::{SplitConfig, stratified_split},
};
use crate::error::DataErr;

/// How raw labels are turned into training targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelMode {
    /// Benign (`0`) against any attack (nonzero).
    #[default]
    Binary,
    /// Every distinct label is its own class, remapped to `0..k` in ascending order.
    MultiClass,
}

impl LabelMode {
    /// Rewrites `labels` in place, returns the number of distinct classes.
    ///
    /// Every coerced label is finite and `-0` is folded into `0`, so labels
    /// compare the same by value and by bits.
    fn coerce(self, labels: &mut [f32]) -> Result<usize, DataErr> {
        for (row, label) in labels.iter_mut().enumerate() {
            if label.is_nan() {
                return Err(DataErr::InvalidLabel { row, value: *label });
            }
            if *label == 0.0 {
                *label = 0.0;
            }
        }

        match self {
            LabelMode::Binary => {
                labels
                    .iter_mut()
                    .for_each(|label| *label = if *label == 0.0 { 0.0 } else { 1.0 });
            }
            LabelMode::MultiClass => {
                let classes = distinct(labels);

                for (row, label) in labels.iter_mut().enumerate() {
                    let code = classes
                        .binary_search_by(|class| class.total_cmp(label))
                        .map_err(|_| DataErr::InvalidLabel { row, value: *label })?;
                    *label = code as f32;
                }
            }
        }

        Ok(distinct(labels).len())
    }
}

fn distinct(labels: &[f32]) -> Vec<f32> {
    let mut sorted = labels.to_vec();
    sorted.sort_by(f32::total_cmp);
    sorted.dedup();
    sorted
}

/// The client's local data: disjoint training and validation sets.
///
/// Read-only once loaded, shared between rounds without locking.
#[derive(Debug, Clone)]
pub struct DataPartition {
    train: Dataset,
    valid: Dataset,
    num_classes: usize,
}

impl DataPartition {
    /// Loads this node's files, merges them and splits them.
    ///
    /// # Arguments
    /// * `sources` - The benign and attack files.
    /// * `mode` - How labels are coerced.
    /// * `split` - Split proportions and seed.
    pub fn load(sources: &DataSources, mode: LabelMode, split: SplitConfig) -> Result<Self, DataErr> {
        let benign = load_csv(&sources.benign)?;
        let attack = load_csv(&sources.attack)?;
        let table = benign.merge(attack)?;

        let partition = Self::from_table(table, mode, split)?;
        info!(
            train = partition.num_train(),
            valid = partition.num_valid(),
            classes = partition.num_classes();
            "local data ready"
        );
        Ok(partition)
    }

    /// Coerces the labels of `table` and splits its rows.
    pub fn from_table(table: Table, mode: LabelMode, split: SplitConfig) -> Result<Self, DataErr> {
        let num_features = table.num_features();
        let (features, mut labels) = table.into_parts();
        let num_classes = mode.coerce(&mut labels)?;

        let (train_rows, valid_rows) = stratified_split(&labels, split)?;

        let all = Dataset::from_rows(features, num_features, labels)?;
        let train = all.select(&train_rows)?;
        let valid = all.select(&valid_rows)?;

        Ok(Self {
            train,
            valid,
            num_classes,
        })
    }

    /// Builds a partition from already split sets.
    pub fn new(train: Dataset, valid: Dataset) -> Self {
        let num_classes = train.num_classes().max(valid.num_classes());
        Self {
            train,
            valid,
            num_classes,
        }
    }

    pub fn train(&self) -> &Dataset {
        &self.train
    }

    pub fn valid(&self) -> &Dataset {
        &self.valid
    }

    pub fn num_train(&self) -> usize {
        self.train.len()
    }

    pub fn num_valid(&self) -> usize {
        self.valid.len()
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }
}
