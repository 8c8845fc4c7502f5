use boosting::{Engine, Params};

use crate::error::{ClientErr, Result};

/// The wire form of a model, opaque to everything but the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelBlob(pub Vec<u8>);

impl ModelBlob {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The engine's learner configuration, serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSnapshot(pub String);

/// Converts models to and from their wire form.
///
/// Failures on the receiving side are reported as `ClientErr::Decode`, kept
/// apart from engine failures so a bad blob only fails its own round.
pub struct ModelCodec<'e, E> {
    engine: &'e E,
}

impl<'e, E: Engine> ModelCodec<'e, E> {
    pub fn new(engine: &'e E) -> Self {
        Self { engine }
    }

    pub fn encode(&self, model: &E::Model) -> Result<ModelBlob> {
        Ok(ModelBlob(self.engine.serialize(model)?))
    }

    /// Rebuilds a model from `blob`. The result shares no state with any
    /// previous local model.
    pub fn decode(&self, blob: &[u8]) -> Result<E::Model> {
        self.engine.deserialize(blob).map_err(ClientErr::Decode)
    }

    pub fn snapshot(&self, model: &E::Model) -> Result<ConfigSnapshot> {
        Ok(ConfigSnapshot(self.engine.save_config(model)?))
    }

    /// The snapshot of a model trained with the local `params`, used before any
    /// model of our own exists.
    pub fn snapshot_params(&self, params: &Params) -> Result<ConfigSnapshot> {
        Ok(ConfigSnapshot(self.engine.params_config(params)?))
    }

    /// Applies a previously captured configuration onto `model`.
    ///
    /// Rejected when the snapshot does not fit the model, e.g. a coordinator
    /// model trained for another task.
    pub fn restore(&self, model: &mut E::Model, snapshot: &ConfigSnapshot) -> Result<()> {
        self.engine
            .load_config(model, &snapshot.0)
            .map_err(ClientErr::Decode)
    }
}
