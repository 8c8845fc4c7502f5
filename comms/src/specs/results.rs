use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Status;

/// A set of opaque tensors. Clients of this protocol answer `get_parameters`
/// with an empty set, models only travel inside fit messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameters {
    pub tensor_type: String,
    pub tensors: Vec<Vec<u8>>,
}

impl Parameters {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }
}

/// The reply to `Command::GetParameters`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParametersRes {
    pub status: Status,
    pub parameters: Parameters,
}

/// The reply to `Command::Evaluate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluateRes {
    pub status: Status,
    pub loss: f64,
    pub num_examples: u64,
    pub metrics: BTreeMap<String, f64>,
}
