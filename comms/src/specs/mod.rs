//! Wire-level records exchanged between a client and the coordinator.

pub mod results;
pub mod status;

pub use results::{EvaluateRes, Parameters, ParametersRes};
pub use status::{Code, Status};
