use serde::{Deserialize, Serialize};

use crate::{
    error::{BoostErr, Result},
    metric::Metric,
    objective::Objective,
};

/// How split candidates are enumerated when growing a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeMethod {
    /// Every midpoint between two distinct feature values.
    Exact,
    /// At most `max_bin` quantile cut points per feature.
    Hist,
}

/// Learner configuration. This is what `Booster::save_config` snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Params {
    pub objective: Objective,
    pub eta: f64,
    pub max_depth: usize,
    pub eval_metric: Metric,
    /// Threads used while growing trees, `0` means one per core.
    pub nthread: usize,
    pub tree_method: TreeMethod,
    pub max_bin: usize,
    pub lambda: f64,
    pub min_child_weight: f64,
    pub base_score: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            objective: Objective::BinaryLogistic,
            eta: 0.3,
            max_depth: 6,
            eval_metric: Metric::LogLoss,
            nthread: 0,
            tree_method: TreeMethod::Hist,
            max_bin: 256,
            lambda: 1.0,
            min_child_weight: 1.0,
            base_score: 0.5,
        }
    }
}

impl Params {
    /// Checks every value is within the range the learner can work with.
    pub fn validate(&self) -> Result<()> {
        fn invalid(name: &'static str, reason: impl Into<String>) -> Result<()> {
            Err(BoostErr::InvalidParam {
                name,
                reason: reason.into(),
            })
        }

        if !(self.eta.is_finite() && self.eta > 0.0) {
            return invalid("eta", format!("{} is not a positive number", self.eta));
        }

        if self.max_depth == 0 {
            return invalid("max_depth", "must be at least 1");
        }

        if !(self.lambda.is_finite() && self.lambda >= 0.0) {
            return invalid("lambda", format!("{} is negative", self.lambda));
        }

        if !(self.min_child_weight.is_finite() && self.min_child_weight >= 0.0) {
            return invalid(
                "min_child_weight",
                format!("{} is negative", self.min_child_weight),
            );
        }

        if self.max_bin < 2 {
            return invalid("max_bin", "must be at least 2");
        }

        if !(self.base_score > 0.0 && self.base_score < 1.0) {
            return invalid("base_score", format!("{} is outside (0, 1)", self.base_score));
        }

        match self.objective {
            Objective::MultiSoftprob { num_class } if num_class < 2 => {
                return invalid("num_class", format!("{num_class} is less than 2"));
            }
            _ => {}
        }

        if self.eval_metric.is_multiclass() != self.objective.is_multiclass() {
            return invalid(
                "eval_metric",
                format!(
                    "`{}` does not apply to `{}`",
                    self.eval_metric.name(),
                    self.objective.name()
                ),
            );
        }

        Ok(())
    }
}
