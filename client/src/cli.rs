use std::{num::NonZeroUsize, path::PathBuf};

use clap::Parser;

/// Federated boosting client: trains a local model on this node's data and
/// serves rounds to a coordinator.
#[derive(Debug, Clone, Parser)]
#[command(name = "client", version, about)]
pub struct Args {
    /// Selects which attack dataset this node holds (0 to 6).
    #[arg(long, env = "NODE_ID", default_value_t = 0, allow_negative_numbers = true)]
    pub node_id: i64,

    /// The coordinator's address.
    #[arg(long, env = "SERVER_ADDRESS", default_value = "127.0.0.1:8080")]
    pub server_address: String,

    /// Directory holding the CSV datasets.
    #[arg(long, env = "DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,

    /// Threads the engine uses while training.
    #[arg(long, env = "NTHREAD", default_value_t = 16)]
    pub nthread: usize,

    /// Boosting rounds per fit.
    #[arg(long, env = "LOCAL_ROUNDS", default_value_t = NonZeroUsize::MIN)]
    pub local_rounds: NonZeroUsize,

    /// Keep every attack class instead of collapsing labels to benign/attack.
    #[arg(long, env = "MULTI_CLASS")]
    pub multi_class: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["client"]).unwrap();

        assert_eq!(args.node_id, 0);
        assert_eq!(args.server_address, "127.0.0.1:8080");
        assert_eq!(args.data_dir, PathBuf::from("."));
        assert_eq!(args.nthread, 16);
        assert_eq!(args.local_rounds.get(), 1);
        assert!(!args.multi_class);
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::try_parse_from([
            "client",
            "--node-id",
            "3",
            "--server-address",
            "10.0.0.1:9000",
            "--local-rounds",
            "2",
            "--multi-class",
        ])
        .unwrap();

        assert_eq!(args.node_id, 3);
        assert_eq!(args.server_address, "10.0.0.1:9000");
        assert_eq!(args.local_rounds.get(), 2);
        assert!(args.multi_class);
    }

    #[test]
    fn zero_local_rounds_is_rejected() {
        assert!(Args::try_parse_from(["client", "--local-rounds", "0"]).is_err());
    }
}
