use std::{
    error::Error,
    fmt::{self, Display},
};

/// The result type used in the entire boosting module.
pub type Result<T> = std::result::Result<T, BoostErr>;

/// The boosting module's error type.
#[derive(Debug)]
pub enum BoostErr {
    SizeMismatch {
        a: &'static str,
        b: &'static str,
        got: usize,
        expected: usize,
    },
    EmptyDataset,
    InvalidLabel {
        row: usize,
        label: f32,
        num_class: usize,
    },
    InvalidParam {
        name: &'static str,
        reason: String,
    },
    IterationMismatch {
        got: usize,
        expected: usize,
    },
    UnsupportedVersion {
        got: [u32; 3],
        expected: [u32; 3],
    },
    Json(serde_json::Error),
    ThreadPool(rayon::ThreadPoolBuildError),
}

impl Display for BoostErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoostErr::SizeMismatch {
                a,
                b,
                got,
                expected,
            } => write!(
                f,
                "there's a size mismatch between {a} and {b}, got {got} and expected {expected}"
            ),
            BoostErr::EmptyDataset => write!(f, "the dataset has no rows"),
            BoostErr::InvalidLabel {
                row,
                label,
                num_class,
            } => write!(
                f,
                "label {label} at row {row} is not a class index in 0..{num_class}"
            ),
            BoostErr::InvalidParam { name, reason } => {
                write!(f, "invalid value for parameter `{name}`: {reason}")
            }
            BoostErr::IterationMismatch { got, expected } => write!(
                f,
                "update requested for iteration {got} but the model has {expected} boosted rounds"
            ),
            BoostErr::UnsupportedVersion { got, expected } => write!(
                f,
                "model was saved by engine version {got:?}, this engine reads version {expected:?}"
            ),
            BoostErr::Json(e) => write!(f, "malformed model document: {e}"),
            BoostErr::ThreadPool(e) => write!(f, "failed to build the training thread pool: {e}"),
        }
    }
}

impl Error for BoostErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BoostErr::Json(e) => Some(e),
            BoostErr::ThreadPool(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for BoostErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<rayon::ThreadPoolBuildError> for BoostErr {
    fn from(value: rayon::ThreadPoolBuildError) -> Self {
        Self::ThreadPool(value)
    }
}
