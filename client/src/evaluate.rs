use boosting::Engine;

use crate::{config::RoundConfig, data::DataPartition, error::Result, report::extract_metric};

/// Name of the evaluation set in the score report.
const VALID_SET: &str = "valid";

/// A single named metric, rounded to 4 decimal digits.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricResult {
    pub name: &'static str,
    pub value: f64,
}

impl MetricResult {
    pub fn new(name: &'static str, value: f64) -> Self {
        Self {
            name,
            value: round4(value),
        }
    }
}

fn round4(value: f64) -> f64 {
    (value * 1e4).round() / 1e4
}

/// Scores the current model on the local validation set.
pub struct EvaluationCycle<'a, E> {
    engine: &'a E,
    config: &'a RoundConfig,
    partition: &'a DataPartition,
}

impl<'a, E: Engine> EvaluationCycle<'a, E> {
    pub fn new(engine: &'a E, config: &'a RoundConfig, partition: &'a DataPartition) -> Self {
        Self {
            engine,
            config,
            partition,
        }
    }

    /// Evaluates `model` at its last boosted round.
    pub fn run(&self, model: &E::Model) -> Result<MetricResult> {
        let iteration = self.engine.boosted_rounds(model).saturating_sub(1);
        let evals = [(self.partition.valid(), VALID_SET)];

        let report = self.engine.score_report(model, &evals, iteration)?;
        let value = extract_metric(&report, &self.config.report_key(VALID_SET))?;

        Ok(MetricResult::new(self.config.metric_label(), value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_are_rounded_to_four_digits() {
        assert_eq!(MetricResult::new("AUC", 0.912345).value, 0.9123);
        assert_eq!(MetricResult::new("AUC", 0.99996).value, 1.0);
        assert_eq!(MetricResult::new("mlogloss", 0.43216).value, 0.4322);
    }
}
