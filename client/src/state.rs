use crate::codec::ConfigSnapshot;

/// Where the client stands in its round lifecycle.
#[derive(Debug)]
pub enum ModelState<M> {
    /// No model yet, the next `fit` without a model from the coordinator bootstraps one.
    Uninitialized,
    /// A model that completed at least one local boosting round.
    Trained(M),
}

impl<M> ModelState<M> {
    pub fn model(&self) -> Option<&M> {
        match self {
            ModelState::Trained(model) => Some(model),
            ModelState::Uninitialized => None,
        }
    }
}

/// Everything the round state machine mutates, kept behind a single lock.
#[derive(Debug)]
pub struct ClientState<M> {
    pub model: ModelState<M>,
    /// Learner configuration captured after the last successful fit. Until
    /// then, received models get the local `RoundConfig` settings.
    pub config: Option<ConfigSnapshot>,
    /// Completed `fit` calls.
    pub fits: usize,
}

impl<M> Default for ClientState<M> {
    fn default() -> Self {
        Self {
            model: ModelState::Uninitialized,
            config: None,
            fits: 0,
        }
    }
}
