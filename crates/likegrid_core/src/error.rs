use std::fmt;

use thiserror::Error;

/// Boxed error raised by a likelihood function implementation
pub type EvaluationError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Which grid dimension a shape check refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    X,
    Y,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::X => write!(f, "x"),
            Direction::Y => write!(f, "y"),
        }
    }
}

/// Errors from building, validating and evaluating likelihood grids
#[derive(Debug, Error)]
pub enum GridError {
    #[error("axis '{name}' has no ticks")]
    EmptyAxis { name: String },

    #[error("index {index} out of range for axis '{axis}' of length {len}")]
    IndexOutOfRange {
        axis: String,
        index: usize,
        len: usize,
    },

    #[error(
        "the dimension of the data and the axis do not match along the {direction} direction \
         (expected {expected}, got {actual})"
    )]
    ShapeMismatch {
        direction: Direction,
        expected: usize,
        actual: usize,
    },

    #[error("likelihood '{id}' is already registered")]
    DuplicateLikelihood { id: String },

    #[error("likelihood '{id}' missing from the evaluated point")]
    MissingLikelihood { id: String },

    #[error("cell ({row}, {column}) outside grid of shape {shape:?}")]
    CellOutOfRange {
        row: usize,
        column: usize,
        shape: (usize, usize),
    },

    #[error("likelihood function failed at (x={x}, y={y}): {source}")]
    Evaluation {
        x: f64,
        y: f64,
        #[source]
        source: EvaluationError,
    },

    #[error("invalid confidence level ({n_sigma} sigma, {dof} dof): {reason}")]
    InvalidConfidenceLevel {
        n_sigma: f64,
        dof: usize,
        reason: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, GridError>;

/// Errors from reading or writing the binary grid container
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode container: {0}")]
    Encode(#[source] bincode::Error),

    #[error("failed to decode container: {0}")]
    Decode(#[source] bincode::Error),

    #[error("not a likelihood grid file (bad magic bytes)")]
    BadMagic,

    #[error("unsupported format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("group '{path}' not found")]
    MissingGroup { path: String },

    #[error("dataset '{name}' not found in group '{group}'")]
    MissingDataset { group: String, name: String },

    #[error("attribute '{name}' not found in group '{group}'")]
    MissingAttribute { group: String, name: String },

    #[error("attribute '{name}' in group '{group}' is not of type {expected}")]
    AttributeType {
        group: String,
        name: String,
        expected: &'static str,
    },

    #[error("dataset '{name}' has rank {found}, expected {expected}")]
    DatasetRank {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("dataset '{name}' has shape {shape:?} whose size overflows")]
    DatasetShape { name: String, shape: Vec<usize> },

    #[error("dataset '{name}' holds {found} values but its shape needs {expected}")]
    DatasetLength {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Grid(#[from] GridError),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;
