use std::{error::Error, fmt, io, path::PathBuf};

use boosting::BoostErr;

/// The client module's result type.
pub type Result<T> = std::result::Result<T, ClientErr>;

/// Startup configuration failures, raised before any protocol operation.
#[derive(Debug)]
pub enum ConfigErr {
    NodeOutOfRange { node_id: i64, max: usize },
    MissingFile { path: PathBuf, node_id: i64 },
}

impl fmt::Display for ConfigErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigErr::NodeOutOfRange { node_id, max } => {
                write!(f, "node-id should be between 0 and {max}, currently is {node_id}")
            }
            ConfigErr::MissingFile { path, node_id } => {
                write!(f, "file not found: {} (node-id={node_id})", path.display())
            }
        }
    }
}

impl Error for ConfigErr {}

/// Failures while reading and partitioning the local datasets.
#[derive(Debug)]
pub enum DataErr {
    Csv(csv::Error),
    Empty {
        path: PathBuf,
    },
    NonNumeric {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },
    HeaderMismatch {
        expected: Vec<String>,
        got: Vec<String>,
    },
    MissingLabel {
        row: usize,
    },
    InvalidLabel {
        row: usize,
        value: f32,
    },
    SplitTooSmall {
        rows: usize,
        test_size: f64,
    },
    Dataset(BoostErr),
}

impl fmt::Display for DataErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataErr::Csv(e) => write!(f, "csv error: {e}"),
            DataErr::Empty { path } => {
                write!(f, "{} has no data rows or no feature columns", path.display())
            }
            DataErr::NonNumeric {
                path,
                row,
                column,
                value,
            } => write!(
                f,
                "{} row {row} column `{column}` holds non-numeric value `{value}`",
                path.display()
            ),
            DataErr::HeaderMismatch { expected, got } => write!(
                f,
                "datasets do not share a header, expected {expected:?}, got {got:?}"
            ),
            DataErr::MissingLabel { row } => write!(f, "row {row} has no label"),
            DataErr::InvalidLabel { row, value } => {
                write!(f, "row {row} has label {value}, which is not a class")
            }
            DataErr::SplitTooSmall { rows, test_size } => write!(
                f,
                "cannot split {rows} rows with test size {test_size} into two non-empty sets"
            ),
            DataErr::Dataset(e) => write!(f, "invalid dataset: {e}"),
        }
    }
}

impl Error for DataErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DataErr::Csv(e) => Some(e),
            DataErr::Dataset(e) => Some(e),
            _ => None,
        }
    }
}

impl From<csv::Error> for DataErr {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<BoostErr> for DataErr {
    fn from(value: BoostErr) -> Self {
        Self::Dataset(value)
    }
}

/// Failures while reading a metric out of the engine's score report.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportErr {
    MetricNotFound { name: String, report: String },
    InvalidValue { name: String, value: String },
}

impl fmt::Display for ReportErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportErr::MetricNotFound { name, report } => {
                write!(f, "metric `{name}` not found in report {report:?}")
            }
            ReportErr::InvalidValue { name, value } => {
                write!(f, "metric `{name}` has unparsable value `{value}`")
            }
        }
    }
}

impl Error for ReportErr {}

/// Client runtime failures.
#[derive(Debug)]
pub enum ClientErr {
    Io(io::Error),
    Config(ConfigErr),
    Data(DataErr),
    /// The model received from the coordinator could not be decoded.
    Decode(BoostErr),
    Engine(BoostErr),
    Report(ReportErr),
    /// `evaluate` was called before any `fit`.
    NotTrained,
    UnexpectedMessage {
        got: &'static str,
    },
}

impl ClientErr {
    /// Whether the failure only concerns the current round. Those are answered
    /// with an error message and the client keeps serving, every other failure
    /// ends the session.
    pub fn is_round_local(&self) -> bool {
        matches!(self, ClientErr::Decode(_) | ClientErr::NotTrained)
    }
}

impl fmt::Display for ClientErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientErr::Io(e) => write!(f, "io error: {e}"),
            ClientErr::Config(e) => write!(f, "configuration error: {e}"),
            ClientErr::Data(e) => write!(f, "data error: {e}"),
            ClientErr::Decode(e) => write!(f, "failed to decode the received model: {e}"),
            ClientErr::Engine(e) => write!(f, "boosting engine failure: {e}"),
            ClientErr::Report(e) => write!(f, "score report error: {e}"),
            ClientErr::NotTrained => write!(f, "evaluate called before any fit"),
            ClientErr::UnexpectedMessage { got } => {
                write!(f, "unexpected message from coordinator: got {got}")
            }
        }
    }
}

impl Error for ClientErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ClientErr::Io(e) => Some(e),
            ClientErr::Config(e) => Some(e),
            ClientErr::Data(e) => Some(e),
            ClientErr::Decode(e) | ClientErr::Engine(e) => Some(e),
            ClientErr::Report(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ClientErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ConfigErr> for ClientErr {
    fn from(value: ConfigErr) -> Self {
        Self::Config(value)
    }
}

impl From<DataErr> for ClientErr {
    fn from(value: DataErr) -> Self {
        Self::Data(value)
    }
}

impl From<ReportErr> for ClientErr {
    fn from(value: ReportErr) -> Self {
        Self::Report(value)
    }
}

/// Engine failures default to fatal, decoding paths map to `Decode` explicitly.
impl From<BoostErr> for ClientErr {
    fn from(value: BoostErr) -> Self {
        Self::Engine(value)
    }
}

/// Boundary conversion for binaries / I/O APIs.
impl From<ClientErr> for io::Error {
    fn from(value: ClientErr) -> Self {
        match value {
            ClientErr::Io(e) => e,
            ClientErr::Config(ConfigErr::MissingFile { .. }) => {
                io::Error::new(io::ErrorKind::NotFound, value)
            }
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
