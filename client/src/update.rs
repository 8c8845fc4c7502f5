use boosting::Engine;
use log::debug;

use crate::{config::RoundConfig, data::DataPartition, error::Result};

/// The local training step of a round: creates a model or boosts an existing one.
pub struct UpdateCycle<'a, E> {
    engine: &'a E,
    config: &'a RoundConfig,
    partition: &'a DataPartition,
}

impl<'a, E: Engine> UpdateCycle<'a, E> {
    pub fn new(engine: &'a E, config: &'a RoundConfig, partition: &'a DataPartition) -> Self {
        Self {
            engine,
            config,
            partition,
        }
    }

    /// Trains a fresh model for the configured amount of local rounds.
    ///
    /// Both local sets are evaluated and logged after every round.
    pub fn bootstrap(&self) -> Result<E::Model> {
        let train = self.partition.train();
        let valid = self.partition.valid();
        let evals = [(valid, "validate"), (train, "train")];

        let model = self.engine.train(
            self.config.params(),
            train,
            &evals,
            self.config.local_rounds(),
        )?;
        Ok(model)
    }

    /// Boosts `model` for the configured amount of local rounds, continuing
    /// from the rounds it already holds.
    pub fn advance(&self, model: &mut E::Model) -> Result<()> {
        for _ in 0..self.config.local_rounds() {
            let iteration = self.engine.boosted_rounds(model);
            self.engine.update(model, self.partition.train(), iteration)?;
            debug!(iteration = iteration; "boosted local round");
        }

        Ok(())
    }
}
