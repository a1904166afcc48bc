use std::error::Error;
use std::fmt::{Display, Formatter};

/// An error from building or evaluating deferred measurement values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeasurementError {
    /// An argument was rejected, such as a multi-qubit mid-circuit measurement.
    InvalidArgument(String),
    /// A branch index outside of `[0, branches)`.
    OutOfRange {
        /// The requested branch.
        index: usize,
        /// Number of available branches, `None` if it does not fit in a usize.
        branches: Option<usize>,
    },
    /// A concrete value was requested while outcomes are still unknown.
    UnknownValue(String),
    /// An outcome could not be represented as the requested type.
    TypeMismatch(String),
}

impl MeasurementError {
    /// Construct a new invalid argument error.
    pub fn invalid<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(msg.into())
    }

    /// Construct a new unknown value error.
    pub fn unknown<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::UnknownValue(msg.into())
    }

    /// Construct a new type mismatch error.
    pub fn mismatch<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::TypeMismatch(msg.into())
    }
}

/// A result which may contain a measurement error.
pub type MeasurementResult<T> = Result<T, MeasurementError>;

impl Error for MeasurementError {}

impl Display for MeasurementError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            Self::OutOfRange {
                index,
                branches: Some(branches),
            } => write!(
                f,
                "branch {} is out of range for a value with {} branches",
                index, branches
            ),
            Self::OutOfRange {
                index,
                branches: None,
            } => write!(
                f,
                "branch {} is out of range, value has too many measurements to enumerate",
                index
            ),
            Self::UnknownValue(msg) => write!(f, "unknown measurement value: {}", msg),
            Self::TypeMismatch(msg) => write!(f, "type mismatch: {}", msg),
        }
    }
}
