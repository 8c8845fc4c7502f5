use std::fmt::Write;

use log::{debug, info};
use ndarray::{Array2, Axis};
use rayon::{ThreadPool, ThreadPoolBuilder, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    dataset::Dataset,
    error::{BoostErr, Result},
    params::{Params, TreeMethod},
    tree::{FeatureCuts, RegTree, TreeGrower},
};

/// Version of the model document layout. Documents with a different major
/// version are rejected on load.
pub const FORMAT_VERSION: [u32; 3] = [1, 0, 0];

/// A gradient-boosted tree ensemble together with the configuration that grows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booster {
    version: [u32; 3],
    params: Params,
    num_features: usize,
    base_margin: f64,
    trees: Vec<RegTree>,
    /// The output group each tree contributes to.
    tree_info: Vec<usize>,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: [u32; 3],
}

#[derive(Serialize, Deserialize)]
struct ConfigDoc {
    version: [u32; 3],
    params: Params,
}

impl Booster {
    /// Creates an untrained booster for `num_features` columns.
    pub fn new(params: Params, num_features: usize) -> Result<Self> {
        params.validate()?;

        Ok(Self {
            version: FORMAT_VERSION,
            base_margin: params.objective.base_margin(params.base_score),
            params,
            num_features,
            trees: Vec::new(),
            tree_info: Vec::new(),
        })
    }

    /// Trains a new booster for `rounds` boosting rounds.
    ///
    /// # Arguments
    /// * `params` - Learner configuration.
    /// * `dtrain` - The training set.
    /// * `evals` - Sets evaluated (and logged) after every round, with their names.
    /// * `rounds` - The amount of boosting rounds.
    pub fn train(
        params: &Params,
        dtrain: &Dataset,
        evals: &[(&Dataset, &str)],
        rounds: usize,
    ) -> Result<Self> {
        let mut booster = Self::new(params.clone(), dtrain.num_features())?;

        for iteration in 0..rounds {
            booster.update(dtrain, iteration)?;

            if !evals.is_empty() {
                info!("{}", booster.eval_set(evals, iteration)?);
            }
        }

        Ok(booster)
    }

    /// Runs one boosting round on `dtrain`, growing one tree per output group.
    ///
    /// # Arguments
    /// * `dtrain` - The training set.
    /// * `iteration` - The round being boosted, must equal `num_boosted_rounds`.
    pub fn update(&mut self, dtrain: &Dataset, iteration: usize) -> Result<()> {
        let expected = self.num_boosted_rounds();
        if iteration != expected {
            return Err(BoostErr::IterationMismatch {
                got: iteration,
                expected,
            });
        }

        self.check_features(dtrain)?;
        self.params.objective.validate_labels(dtrain.labels())?;

        let pool = self.thread_pool()?;
        let margins = pool.install(|| self.predict_margin(dtrain))?;
        let gpairs = self
            .params
            .objective
            .gradients(margins.view(), dtrain.labels());

        let cuts = match self.params.tree_method {
            TreeMethod::Hist => Some(pool.install(|| {
                FeatureCuts::build(dtrain.features(), self.params.max_bin)
            })),
            TreeMethod::Exact => None,
        };

        let grower = TreeGrower::new(dtrain.features(), &self.params, cuts.as_ref());
        let trees: Vec<RegTree> = gpairs
            .axis_iter(Axis(1))
            .map(|group| {
                let group = group.to_vec();
                pool.install(|| grower.grow(&group))
            })
            .collect();

        for (group, tree) in trees.into_iter().enumerate() {
            debug!(iteration = iteration, group = group, leaves = tree.num_leaves(); "grew tree");
            self.trees.push(tree);
            self.tree_info.push(group);
        }

        Ok(())
    }

    /// The amount of completed boosting rounds.
    pub fn num_boosted_rounds(&self) -> usize {
        self.trees.len() / self.params.objective.num_groups()
    }

    pub fn num_features(&self) -> usize {
        self.num_features
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Raw, untransformed scores laid out `rows x groups`.
    pub fn predict_margin(&self, data: &Dataset) -> Result<Array2<f64>> {
        self.check_features(data)?;

        let groups = self.params.objective.num_groups();
        let features = data.features();

        let margins: Vec<f64> = (0..data.len())
            .into_par_iter()
            .flat_map_iter(|row| {
                let row = features.row(row);
                let mut out = vec![self.base_margin; groups];
                for (tree, &group) in self.trees.iter().zip(&self.tree_info) {
                    out[group] += tree.predict(row);
                }
                out
            })
            .collect();

        Array2::from_shape_vec((data.len(), groups), margins).map_err(|_| BoostErr::SizeMismatch {
            a: "margins",
            b: "rows x groups",
            got: data.len() * groups,
            expected: data.len() * groups,
        })
    }

    /// Predicted probabilities laid out `rows x groups`.
    pub fn predict(&self, data: &Dataset) -> Result<Array2<f64>> {
        let margins = self.predict_margin(data)?;
        Ok(self.params.objective.transform(margins))
    }

    /// Evaluates the configured metric on every set and renders the engine's report line:
    /// `[<iteration>]\t<name>-<metric>:<value>...`.
    pub fn eval_set(&self, evals: &[(&Dataset, &str)], iteration: usize) -> Result<String> {
        let metric = self.params.eval_metric;
        let mut report = format!("[{iteration}]");

        for (data, name) in evals {
            let probs = self.predict(data)?;
            let value = metric.evaluate(probs.view(), data.labels());

            // Writing into a `String` cannot fail.
            let _ = write!(report, "\t{name}-{}:{value:.6}", metric.name());
        }

        Ok(report)
    }

    /// Serializes the whole model, trees and configuration, as a JSON document.
    pub fn save_raw(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Reads a model saved with `save_raw`.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let probe: VersionProbe = serde_json::from_slice(bytes)?;
        check_version(probe.version)?;

        let booster: Self = serde_json::from_slice(bytes)?;
        booster.validate()?;
        Ok(booster)
    }

    /// Replaces this booster's whole state with the model in `bytes`.
    pub fn load_model(&mut self, bytes: &[u8]) -> Result<()> {
        *self = Self::from_slice(bytes)?;
        Ok(())
    }

    /// Snapshots the learner configuration as JSON text.
    pub fn save_config(&self) -> Result<String> {
        let doc = ConfigDoc {
            version: self.version,
            params: self.params.clone(),
        };

        Ok(serde_json::to_string(&doc)?)
    }

    /// The snapshot `save_config` would produce for a booster built from
    /// `params`, without building one.
    pub fn config_for(params: &Params) -> Result<String> {
        params.validate()?;

        let doc = ConfigDoc {
            version: FORMAT_VERSION,
            params: params.clone(),
        };

        Ok(serde_json::to_string(&doc)?)
    }

    /// Restores a configuration snapshot. The trees are kept, so the snapshot must
    /// describe the same task (objective and class count).
    pub fn load_config(&mut self, config: &str) -> Result<()> {
        let doc: ConfigDoc = serde_json::from_str(config)?;
        check_version(doc.version)?;
        doc.params.validate()?;

        if doc.params.objective != self.params.objective {
            return Err(BoostErr::InvalidParam {
                name: "objective",
                reason: format!(
                    "snapshot targets `{}` but the model was trained for `{}`",
                    doc.params.objective.name(),
                    self.params.objective.name()
                ),
            });
        }

        self.params = doc.params;
        Ok(())
    }

    fn check_features(&self, data: &Dataset) -> Result<()> {
        if data.num_features() != self.num_features {
            return Err(BoostErr::SizeMismatch {
                a: "dataset",
                b: "model",
                got: data.num_features(),
                expected: self.num_features,
            });
        }

        Ok(())
    }

    fn thread_pool(&self) -> Result<ThreadPool> {
        Ok(ThreadPoolBuilder::new()
            .num_threads(self.params.nthread)
            .build()?)
    }

    fn validate(&self) -> Result<()> {
        self.params.validate()?;

        let groups = self.params.objective.num_groups();
        if self.trees.len() != self.tree_info.len() || self.trees.len() % groups != 0 {
            return Err(BoostErr::SizeMismatch {
                a: "trees",
                b: "tree_info",
                got: self.tree_info.len(),
                expected: self.trees.len(),
            });
        }

        if let Some(&group) = self.tree_info.iter().find(|&&group| group >= groups) {
            return Err(BoostErr::InvalidParam {
                name: "tree_info",
                reason: format!("group {group} of {groups}"),
            });
        }

        if !self.base_margin.is_finite() {
            return Err(BoostErr::InvalidParam {
                name: "base_margin",
                reason: format!("{} is not finite", self.base_margin),
            });
        }

        self.trees
            .iter()
            .try_for_each(|tree| tree.validate(self.num_features))
    }
}

fn check_version(got: [u32; 3]) -> Result<()> {
    if got[0] != FORMAT_VERSION[0] {
        return Err(BoostErr::UnsupportedVersion {
            got,
            expected: FORMAT_VERSION,
        });
    }

    Ok(())
}
