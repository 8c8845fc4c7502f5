use ndarray::ArrayView2;
use rayon::prelude::*;

use super::{FeatureCuts, Node, RegTree};
use crate::{
    objective::GradPair,
    params::{Params, TreeMethod},
};

/// Splits whose loss reduction does not exceed this are not worth a node.
const MIN_SPLIT_LOSS: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Split {
    feature: usize,
    threshold: f64,
    gain: f64,
}

/// Greedily grows one depth-limited regression tree over gradient statistics.
pub(crate) struct TreeGrower<'a> {
    features: ArrayView2<'a, f32>,
    params: &'a Params,
    cuts: Option<&'a FeatureCuts>,
}

impl<'a> TreeGrower<'a> {
    /// Creates a new `TreeGrower`.
    ///
    /// # Arguments
    /// * `features` - The training matrix.
    /// * `params` - Learner configuration, `cuts` must be given when it asks for `hist`.
    /// * `cuts` - Split candidates for the `hist` method.
    pub(crate) fn new(
        features: ArrayView2<'a, f32>,
        params: &'a Params,
        cuts: Option<&'a FeatureCuts>,
    ) -> Self {
        debug_assert!(params.tree_method == TreeMethod::Exact || cuts.is_some());
        Self {
            features,
            params,
            cuts,
        }
    }

    /// Grows a tree fitting `gpairs`, one pair per training row.
    ///
    /// Leaf values are already scaled by the learning rate.
    pub(crate) fn grow(&self, gpairs: &[GradPair]) -> RegTree {
        let rows = (0..self.features.nrows()).collect();
        let mut nodes = Vec::new();
        self.build(rows, 0, gpairs, &mut nodes);
        RegTree::from_nodes(nodes)
    }

    fn build(&self, rows: Vec<usize>, depth: usize, gpairs: &[GradPair], nodes: &mut Vec<Node>) -> usize {
        let idx = nodes.len();
        nodes.push(Node::Leaf { value: 0.0 });

        let sum = rows
            .iter()
            .fold(GradPair::default(), |acc, &row| acc + gpairs[row]);

        if depth < self.params.max_depth {
            if let Some(split) = self.best_split(&rows, sum, gpairs) {
                let (left_rows, right_rows): (Vec<_>, Vec<_>) = rows.into_iter().partition(|&row| {
                    f64::from(self.features[[row, split.feature]]) < split.threshold
                });

                let left = self.build(left_rows, depth + 1, gpairs, nodes);
                let right = self.build(right_rows, depth + 1, gpairs, nodes);

                nodes[idx] = Node::Split {
                    feature: split.feature,
                    threshold: split.threshold,
                    left,
                    right,
                };
                return idx;
            }
        }

        nodes[idx] = Node::Leaf {
            value: self.leaf_weight(sum),
        };
        idx
    }

    /// The best split over every feature. Features are searched in parallel, ties
    /// go to the lowest feature index so the result does not depend on scheduling.
    fn best_split(&self, rows: &[usize], sum: GradPair, gpairs: &[GradPair]) -> Option<Split> {
        let candidates: Vec<Option<Split>> = (0..self.features.ncols())
            .into_par_iter()
            .map(|feature| self.best_split_on(feature, rows, sum, gpairs))
            .collect();

        candidates
            .into_iter()
            .flatten()
            .fold(None, |best, split| match best {
                Some(best) if best.gain >= split.gain => Some(best),
                _ => Some(split),
            })
    }

    fn best_split_on(
        &self,
        feature: usize,
        rows: &[usize],
        sum: GradPair,
        gpairs: &[GradPair],
    ) -> Option<Split> {
        let mut entries: Vec<(f32, GradPair)> = rows
            .iter()
            .map(|&row| (self.features[[row, feature]], gpairs[row]))
            .filter(|(value, _)| !value.is_nan())
            .collect();
        entries.sort_by(|a, b| a.0.total_cmp(&b.0));

        let parent = self.score(sum);
        let min_child_weight = self.params.min_child_weight;

        let mut left = GradPair::default();
        let mut best: Option<Split> = None;

        for pair in entries.windows(2) {
            let [(lo, stats), (hi, _)] = [pair[0], pair[1]];
            left += stats;

            if lo == hi {
                continue;
            }

            let right = sum - left;
            if left.hess < min_child_weight || right.hess < min_child_weight {
                continue;
            }

            let Some(threshold) = self.threshold(feature, lo, hi) else {
                continue;
            };

            let gain = self.score(left) + self.score(right) - parent;
            if gain > MIN_SPLIT_LOSS && best.is_none_or(|best| gain > best.gain) {
                best = Some(Split {
                    feature,
                    threshold,
                    gain,
                });
            }
        }

        best
    }

    fn threshold(&self, feature: usize, lo: f32, hi: f32) -> Option<f64> {
        match (self.params.tree_method, self.cuts) {
            (TreeMethod::Hist, Some(cuts)) => cuts.between(feature, lo, hi),
            _ => Some((f64::from(lo) + f64::from(hi)) / 2.0),
        }
    }

    fn score(&self, stats: GradPair) -> f64 {
        stats.grad * stats.grad / (stats.hess + self.params.lambda)
    }

    fn leaf_weight(&self, stats: GradPair) -> f64 {
        -stats.grad / (stats.hess + self.params.lambda) * self.params.eta
    }
}
