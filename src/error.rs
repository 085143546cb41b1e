//! Error types and macros for terminating on errors.

use std::{error, fmt, io};

#[cfg(not(feature = "for-testing"))]
#[macro_export]
macro_rules! exit_with_error {
    ($($print_arg:tt)*) => {{
        eprintln!($($print_arg)*);
        quit::with_code(1);
    }};
}

#[cfg(feature = "for-testing")]
#[macro_export]
macro_rules! exit_with_error {
    ($($print_arg:tt)*) => {{
        panic!($($print_arg)*);
    }};
}

#[macro_export]
macro_rules! exit_on_error {
    ($result:expr, $($print_arg:tt)*) => {
        match $result {
            Ok(value) => value,
            Err(err) => {
                $crate::exit_with_error!($($print_arg)*, err)
            }
        }
    };
}

#[macro_export]
macro_rules! exit_on_false {
    ($logic:expr, $($print_arg:tt)*) => {
        if $logic {
            true
        } else {
            $crate::exit_with_error!($($print_arg)*)
        }
    };
}

/// Errors arising from constructing or querying regular grids.
#[derive(Clone, Debug, PartialEq)]
pub enum GridError {
    /// The grid definition is malformed.
    Configuration(String),
    /// The number of query coordinates does not match the number of grid axes.
    DimensionMismatch { expected: usize, actual: usize },
    /// The per-axis coordinate arrays of a query have different lengths.
    RaggedCoordinates { lengths: Vec<usize> },
}

impl GridError {
    /// Whether the error stems from a malformed query rather than a malformed grid.
    pub fn is_dimension_mismatch(&self) -> bool {
        !matches!(self, Self::Configuration(_))
    }
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(message) => write!(f, "Invalid grid configuration: {}", message),
            Self::DimensionMismatch { expected, actual } => write!(
                f,
                "Dimension mismatch: expected {} coordinates per point, got {}",
                expected, actual
            ),
            Self::RaggedCoordinates { lengths } => write!(
                f,
                "Dimension mismatch: coordinate arrays have different lengths {:?}",
                lengths
            ),
        }
    }
}

impl error::Error for GridError {}

impl From<GridError> for io::Error {
    fn from(err: GridError) -> Self {
        let kind = match err {
            GridError::Configuration(_) => io::ErrorKind::InvalidData,
            _ => io::ErrorKind::InvalidInput,
        };
        io::Error::new(kind, err)
    }
}

/// Result type for grid operations.
pub type GridResult<T> = Result<T, GridError>;
