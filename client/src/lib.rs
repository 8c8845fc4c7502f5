//! Federated boosting client: one local gradient-boosted model trained on this
//! node's private data and exchanged with a coordinator round after round.

pub mod cli;
pub mod client;
pub mod codec;
pub mod config;
pub mod data;
pub mod error;
pub mod evaluate;
pub mod report;
pub mod session;
pub mod state;
pub mod update;

pub use client::{Client, EvaluateOutcome, FitOutcome};
pub use config::RoundConfig;
pub use error::{ClientErr, Result};
pub use session::Session;
