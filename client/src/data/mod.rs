//! Local data provisioning: locating this node's CSV files, loading them and
//! splitting them into a training and a validation set.

pub mod loader;
pub mod partition;
pub mod sources;
pub mod split;

pub use loader::{Table, load_csv};
pub use partition::{DataPartition, LabelMode};
pub use sources::DataSources;
pub use split::{SplitConfig, stratified_split};
