use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::error::{BoostErr, Result};

/// A dense, labeled feature matrix. Rows are examples, columns are features.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Array2<f32>,
    labels: Array1<f32>,
}

impl Dataset {
    /// Creates a new `Dataset`.
    ///
    /// # Arguments
    /// * `features` - A `rows x features` matrix.
    /// * `labels` - One label per row.
    ///
    /// # Errors
    /// `BoostErr::EmptyDataset` if there are no rows or no feature columns,
    /// `BoostErr::SizeMismatch` if the label count differs from the row count.
    pub fn new(features: Array2<f32>, labels: Array1<f32>) -> Result<Self> {
        if features.nrows() == 0 || features.ncols() == 0 {
            return Err(BoostErr::EmptyDataset);
        }

        if features.nrows() != labels.len() {
            return Err(BoostErr::SizeMismatch {
                a: "features",
                b: "labels",
                got: labels.len(),
                expected: features.nrows(),
            });
        }

        Ok(Self { features, labels })
    }

    /// Creates a new `Dataset` from a row-major buffer.
    ///
    /// # Arguments
    /// * `data` - `labels.len() * num_features` values, row after row.
    /// * `num_features` - The amount of columns per row.
    /// * `labels` - One label per row.
    pub fn from_rows(data: Vec<f32>, num_features: usize, labels: Vec<f32>) -> Result<Self> {
        let rows = labels.len();
        if data.len() != rows * num_features {
            return Err(BoostErr::SizeMismatch {
                a: "data",
                b: "rows x features",
                got: data.len(),
                expected: rows * num_features,
            });
        }

        let features = Array2::from_shape_vec((rows, num_features), data).map_err(|_| {
            BoostErr::SizeMismatch {
                a: "data",
                b: "rows x features",
                got: rows * num_features,
                expected: rows * num_features,
            }
        })?;

        Self::new(features, Array1::from_vec(labels))
    }

    /// Returns a new dataset holding the given rows, in the given order.
    pub fn select(&self, rows: &[usize]) -> Result<Self> {
        Self::new(
            self.features.select(Axis(0), rows),
            self.labels.select(Axis(0), rows),
        )
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[inline]
    pub fn num_features(&self) -> usize {
        self.features.ncols()
    }

    #[inline]
    pub fn features(&self) -> ArrayView2<'_, f32> {
        self.features.view()
    }

    #[inline]
    pub fn labels(&self) -> ArrayView1<'_, f32> {
        self.labels.view()
    }

    /// The amount of distinct label values.
    pub fn num_classes(&self) -> usize {
        let mut labels = self.labels.to_vec();
        labels.sort_by(f32::total_cmp);
        labels.dedup();
        labels.len()
    }
}
