use crate::{booster::Booster, dataset::Dataset, error::Result, params::Params};

/// The boosting operations a federated client drives.
///
/// The model type is opaque to callers, it only crosses process boundaries
/// through `serialize` and `deserialize`.
pub trait Engine: Send + Sync + 'static {
    type Model: Send + 'static;

    /// Trains a fresh model for `rounds` rounds, logging `evals` after each one.
    fn train(
        &self,
        params: &Params,
        dtrain: &Dataset,
        evals: &[(&Dataset, &str)],
        rounds: usize,
    ) -> Result<Self::Model>;

    /// Boosts one more round on `dtrain`. `iteration` is the round being boosted.
    fn update(&self, model: &mut Self::Model, dtrain: &Dataset, iteration: usize) -> Result<()>;

    /// Renders the textual evaluation report of `model` on `evals`.
    fn score_report(
        &self,
        model: &Self::Model,
        evals: &[(&Dataset, &str)],
        iteration: usize,
    ) -> Result<String>;

    fn serialize(&self, model: &Self::Model) -> Result<Vec<u8>>;

    fn deserialize(&self, bytes: &[u8]) -> Result<Self::Model>;

    fn boosted_rounds(&self, model: &Self::Model) -> usize;

    fn save_config(&self, model: &Self::Model) -> Result<String>;

    fn load_config(&self, model: &mut Self::Model, config: &str) -> Result<()>;

    /// The configuration snapshot of a model that would be trained with `params`.
    fn params_config(&self, params: &Params) -> Result<String>;
}

/// The gradient-boosted tree `Engine`, backed by `Booster`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GbtEngine;

impl Engine for GbtEngine {
    type Model = Booster;

    fn train(
        &self,
        params: &Params,
        dtrain: &Dataset,
        evals: &[(&Dataset, &str)],
        rounds: usize,
    ) -> Result<Booster> {
        Booster::train(params, dtrain, evals, rounds)
    }

    fn update(&self, model: &mut Booster, dtrain: &Dataset, iteration: usize) -> Result<()> {
        model.update(dtrain, iteration)
    }

    fn score_report(
        &self,
        model: &Booster,
        evals: &[(&Dataset, &str)],
        iteration: usize,
    ) -> Result<String> {
        model.eval_set(evals, iteration)
    }

    fn serialize(&self, model: &Booster) -> Result<Vec<u8>> {
        model.save_raw()
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Booster> {
        Booster::from_slice(bytes)
    }

    fn boosted_rounds(&self, model: &Booster) -> usize {
        model.num_boosted_rounds()
    }

    fn save_config(&self, model: &Booster) -> Result<String> {
        model.save_config()
    }

    fn load_config(&self, model: &mut Booster, config: &str) -> Result<()> {
        model.load_config(config)
    }

    fn params_config(&self, params: &Params) -> Result<String> {
        Booster::config_for(params)
    }
}
