use std::num::NonZeroUsize;

use boosting::{Metric, Objective, Params, TreeMethod};

const ETA: f64 = 0.1;
const MAX_DEPTH: usize = 8;

/// Immutable hyperparameters for every round of a client instance.
///
/// Built once at startup from the label cardinality of the local data.
#[derive(Debug, Clone)]
pub struct RoundConfig {
    params: Params,
    local_rounds: NonZeroUsize,
    num_classes: usize,
}

impl RoundConfig {
    /// Creates a new round configuration.
    ///
    /// # Arguments
    /// * `num_classes` - Distinct labels in the local data.
    /// * `nthread` - Threads the engine may use inside a single call.
    /// * `local_rounds` - Boosting rounds per `fit`.
    ///
    /// # Returns
    /// A `RoundConfig` using a logistic objective scored by AUC for two classes
    /// or less, and a softmax objective scored by mlogloss otherwise.
    pub fn for_classes(num_classes: usize, nthread: usize, local_rounds: NonZeroUsize) -> Self {
        let (objective, eval_metric) = if num_classes <= 2 {
            (Objective::BinaryLogistic, Metric::Auc)
        } else {
            (
                Objective::MultiSoftprob {
                    num_class: num_classes,
                },
                Metric::MLogLoss,
            )
        };

        let params = Params {
            objective,
            eta: ETA,
            max_depth: MAX_DEPTH,
            eval_metric,
            nthread,
            tree_method: TreeMethod::Hist,
            ..Params::default()
        };

        Self {
            params,
            local_rounds,
            num_classes,
        }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn local_rounds(&self) -> usize {
        self.local_rounds.get()
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// The name under which the evaluation metric is reported to the coordinator.
    pub fn metric_label(&self) -> &'static str {
        if self.num_classes <= 2 { "AUC" } else { "mlogloss" }
    }

    /// The score report field holding the metric for the evaluation set `set`.
    pub fn report_key(&self, set: &str) -> String {
        format!("{set}-{}", self.params.eval_metric.name())
    }
}
