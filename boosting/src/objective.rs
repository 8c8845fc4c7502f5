use std::ops::{Add, AddAssign, Sub};

use ndarray::{Array2, ArrayView1, ArrayView2, ArrayViewMut1, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{BoostErr, Result};

const MIN_HESS: f64 = 1e-16;

/// First and second order derivatives of the loss for one example and one output group.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GradPair {
    pub grad: f64,
    pub hess: f64,
}

impl GradPair {
    pub fn new(grad: f64, hess: f64) -> Self {
        Self { grad, hess }
    }
}

impl Add for GradPair {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.grad + rhs.grad, self.hess + rhs.hess)
    }
}

impl AddAssign for GradPair {
    fn add_assign(&mut self, rhs: Self) {
        self.grad += rhs.grad;
        self.hess += rhs.hess;
    }
}

impl Sub for GradPair {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.grad - rhs.grad, self.hess - rhs.hess)
    }
}

/// The learning task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name")]
pub enum Objective {
    /// Logistic regression on a `{0, 1}` label, outputs a probability.
    #[serde(rename = "binary:logistic")]
    BinaryLogistic,
    /// Softmax over `num_class` classes, outputs one probability per class.
    #[serde(rename = "multi:softprob")]
    MultiSoftprob { num_class: usize },
}

impl Objective {
    pub fn name(&self) -> &'static str {
        match self {
            Objective::BinaryLogistic => "binary:logistic",
            Objective::MultiSoftprob { .. } => "multi:softprob",
        }
    }

    pub fn is_multiclass(&self) -> bool {
        matches!(self, Objective::MultiSoftprob { .. })
    }

    /// The amount of trees grown per boosting round.
    pub fn num_groups(&self) -> usize {
        match *self {
            Objective::BinaryLogistic => 1,
            Objective::MultiSoftprob { num_class } => num_class,
        }
    }

    /// The margin every prediction starts from.
    pub fn base_margin(&self, base_score: f64) -> f64 {
        match self {
            Objective::BinaryLogistic => (base_score / (1.0 - base_score)).ln(),
            Objective::MultiSoftprob { .. } => 0.0,
        }
    }

    /// Checks every label is a valid target for this task.
    pub fn validate_labels(&self, labels: ArrayView1<'_, f32>) -> Result<()> {
        let num_class = self.num_groups().max(2);

        let bad = labels.iter().enumerate().find(|&(_, &label)| match self {
            Objective::BinaryLogistic => !(0.0..=1.0).contains(&label),
            Objective::MultiSoftprob { num_class } => {
                label.fract() != 0.0 || label < 0.0 || label >= *num_class as f32
            }
        });

        match bad {
            Some((row, &label)) => Err(BoostErr::InvalidLabel {
                row,
                label,
                num_class,
            }),
            None => Ok(()),
        }
    }

    /// Computes the gradient pairs of every example, laid out `rows x groups`.
    pub fn gradients(
        &self,
        margins: ArrayView2<'_, f64>,
        labels: ArrayView1<'_, f32>,
    ) -> Array2<GradPair> {
        let mut out = Array2::default(margins.raw_dim());

        for ((margin, label), mut pairs) in margins
            .axis_iter(Axis(0))
            .zip(labels)
            .zip(out.axis_iter_mut(Axis(0)))
        {
            match self {
                Objective::BinaryLogistic => {
                    let p = sigmoid(margin[0]);
                    let y = f64::from(*label);
                    pairs[0] = GradPair::new(p - y, (p * (1.0 - p)).max(MIN_HESS));
                }
                Objective::MultiSoftprob { .. } => {
                    let mut probs = margin.to_owned();
                    softmax(probs.view_mut());

                    for (k, (p, pair)) in probs.iter().zip(pairs.iter_mut()).enumerate() {
                        let y = if k as f32 == *label { 1.0 } else { 0.0 };
                        *pair = GradPair::new(p - y, (2.0 * p * (1.0 - p)).max(MIN_HESS));
                    }
                }
            }
        }

        out
    }

    /// Turns raw margins into probabilities, in place.
    pub fn transform(&self, mut margins: Array2<f64>) -> Array2<f64> {
        match self {
            Objective::BinaryLogistic => margins.mapv_inplace(sigmoid),
            Objective::MultiSoftprob { .. } => {
                for row in margins.axis_iter_mut(Axis(0)) {
                    softmax(row);
                }
            }
        }

        margins
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn softmax(mut row: ArrayViewMut1<'_, f64>) {
    let max = row.fold(f64::NEG_INFINITY, |acc, &x| acc.max(x));
    row.mapv_inplace(|x| (x - max).exp());
    let sum = row.sum();
    row.mapv_inplace(|x| x / sum);
}
