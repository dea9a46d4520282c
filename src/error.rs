use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KdTreeError {
    /// A coordinate was requested for an axis other than 0 (x) or 1 (y).
    #[error("Invalid axis {0}: only 0 or 1 expected")]
    InvalidAxis(usize),

    /// A range query whose lower corner exceeds its upper corner.
    #[error("Invalid range: lower bound exceeds upper bound on axis {axis}")]
    InvalidRange {
        /// The first axis on which `lo > hi`.
        axis: usize,
    },
}

pub type Result<T> = std::result::Result<T, KdTreeError>;
