use std::sync::Arc;

use boosting::Engine;
use comms::specs::{Parameters, ParametersRes, Status};
use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::{
    codec::{ModelBlob, ModelCodec},
    config::RoundConfig,
    data::DataPartition,
    error::{ClientErr, Result},
    evaluate::{EvaluationCycle, MetricResult},
    state::{ClientState, ModelState},
    update::UpdateCycle,
};

/// What a `fit` hands back to the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOutcome {
    pub model: ModelBlob,
    /// Rows of the local training set.
    pub num_examples: usize,
}

/// What an `evaluate` hands back to the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluateOutcome {
    pub metric: MetricResult,
    /// Rows of the local validation set.
    pub num_examples: usize,
    pub loss: f64,
}

/// The round state machine of a federated client.
///
/// Owns the single local model. Concurrent calls are serialized on the state
/// lock, the data and the configuration are read-only.
pub struct Client<E: Engine> {
    engine: E,
    config: Arc<RoundConfig>,
    partition: Arc<DataPartition>,
    state: Mutex<ClientState<E::Model>>,
}

impl<E: Engine> Client<E> {
    /// Creates a new `Client` without a model.
    ///
    /// # Arguments
    /// * `engine` - The boosting engine.
    /// * `config` - Hyperparameters for every round.
    /// * `partition` - The local training and validation sets.
    pub fn new(engine: E, config: Arc<RoundConfig>, partition: Arc<DataPartition>) -> Self {
        Self {
            engine,
            config,
            partition,
            state: Mutex::new(ClientState::default()),
        }
    }

    /// The client keeps no parameters outside its model blob, so this is always
    /// an empty set.
    pub fn get_parameters(&self) -> ParametersRes {
        ParametersRes {
            status: Status::ok(),
            parameters: Parameters::empty(),
        }
    }

    /// Runs the local training step of a round.
    ///
    /// # Arguments
    /// * `incoming` - The coordinator's model, if it has one. It replaces any
    ///   local model before training continues on it, with the local learner
    ///   settings applied over the ones it carries.
    ///
    /// # Returns
    /// The encoded model after training and the amount of training rows.
    ///
    /// # Errors
    /// `ClientErr::Decode` if `incoming` is not a usable model or was trained
    /// for another task, the local state is left as it was.
    pub fn fit(&self, incoming: Option<&[u8]>) -> Result<FitOutcome> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let codec = ModelCodec::new(&self.engine);
        let cycle = UpdateCycle::new(&self.engine, &self.config, &self.partition);

        if let Some(blob) = incoming {
            let snapshot = match &state.config {
                Some(snapshot) => snapshot.clone(),
                None => codec.snapshot_params(self.config.params())?,
            };

            let mut model = codec.decode(blob)?;
            codec.restore(&mut model, &snapshot)?;

            debug!(
                bytes = blob.len(),
                rounds = self.engine.boosted_rounds(&model);
                "decoded coordinator model"
            );
            cycle.advance(&mut model)?;
            state.model = ModelState::Trained(model);
        } else if let ModelState::Trained(model) = &mut state.model {
            warn!("fit without a coordinator model, continuing the local one");
            cycle.advance(model)?;
        } else {
            info!("bootstrapping a new model");
            state.model = ModelState::Trained(cycle.bootstrap()?);
        }

        let model = state.model.model().ok_or(ClientErr::NotTrained)?;
        let snapshot = codec.snapshot(model)?;
        let blob = codec.encode(model)?;

        debug!(
            bytes = blob.len(),
            rounds = self.engine.boosted_rounds(model);
            "fit done"
        );

        state.config = Some(snapshot);
        state.fits += 1;

        Ok(FitOutcome {
            model: blob,
            num_examples: self.partition.num_train(),
        })
    }

    /// Scores the current model on the local validation set.
    ///
    /// # Errors
    /// `ClientErr::NotTrained` if no `fit` completed yet.
    pub fn evaluate(&self) -> Result<EvaluateOutcome> {
        let state = self.state.lock();
        let model = state.model.model().ok_or(ClientErr::NotTrained)?;

        let metric = EvaluationCycle::new(&self.engine, &self.config, &self.partition).run(model)?;
        debug!(value = metric.value; "evaluated {}", metric.name);

        Ok(EvaluateOutcome {
            metric,
            num_examples: self.partition.num_valid(),
            loss: 0.0,
        })
    }

    /// Boosting rounds held by the current model, `None` before the first fit.
    pub fn boosted_rounds(&self) -> Option<usize> {
        let state = self.state.lock();
        state
            .model
            .model()
            .map(|model| self.engine.boosted_rounds(model))
    }

    /// Completed `fit` calls.
    pub fn fits(&self) -> usize {
        self.state.lock().fits
    }
}
