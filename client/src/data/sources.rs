use std::path::{Path, PathBuf};

use crate::error::ConfigErr;

/// Traffic every node holds.
pub const BENIGN_FILE: &str = "Dataset_Benign.csv";

/// One attack family per node, indexed by node id.
pub const ATTACK_FILES: [&str; 7] = [
    "Dataset_BruteForce.csv",
    "Dataset_DDoS.csv",
    "Dataset_DoS.csv",
    "Dataset_Mirai.csv",
    "Dataset_Recon.csv",
    "Dataset_Spoofing.csv",
    "Dataset_Web-based.csv",
];

/// The files a node reads its local data from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSources {
    pub benign: PathBuf,
    pub attack: PathBuf,
}

impl DataSources {
    /// Resolves the files for `node_id` under `dir`.
    ///
    /// # Arguments
    /// * `dir` - Directory holding the datasets.
    /// * `node_id` - Index into `ATTACK_FILES`.
    ///
    /// # Errors
    /// `ConfigErr::NodeOutOfRange` for an unknown node id,
    /// `ConfigErr::MissingFile` if either file does not exist.
    pub fn for_node(dir: &Path, node_id: i64) -> Result<Self, ConfigErr> {
        let attack = usize::try_from(node_id)
            .ok()
            .and_then(|idx| ATTACK_FILES.get(idx))
            .ok_or(ConfigErr::NodeOutOfRange {
                node_id,
                max: ATTACK_FILES.len() - 1,
            })?;

        let sources = Self {
            benign: dir.join(BENIGN_FILE),
            attack: dir.join(attack),
        };

        for path in [&sources.benign, &sources.attack] {
            if !path.is_file() {
                return Err(ConfigErr::MissingFile {
                    path: path.clone(),
                    node_id,
                });
            }
        }

        Ok(sources)
    }
}
