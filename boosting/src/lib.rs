//! A gradient-boosted decision tree learner: binary logistic and softmax
//! objectives, exact and histogram split finding, JSON model documents.

pub mod booster;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod metric;
pub mod objective;
pub mod params;
pub mod tree;

pub use booster::Booster;
pub use dataset::Dataset;
pub use engine::{Engine, GbtEngine};
pub use error::{BoostErr, Result};
pub use metric::Metric;
pub use objective::Objective;
pub use params::{Params, TreeMethod};
