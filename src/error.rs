//! Error types for u-anneal.

use thiserror::Error;

/// Errors raised while building states, coupling tensors, models and
/// annealers.
///
/// Annealing itself never fails: once a model is constructed, sweeps
/// always complete and the caller judges the quality of the result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnnealError {
    /// A value or container was malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The textual state type was neither `qubo` nor `ising`.
    #[error("unknown state type \"{0}\"")]
    UnknownStateType(String),

    /// Two shapes that must agree did not.
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// A coordinate fell outside its shape.
    #[error("index {index:?} out of range for shape {shape:?}")]
    IndexOutOfRange { index: Vec<usize>, shape: Vec<usize> },

    /// Neither an initial state nor a state shape was supplied.
    #[error("state_shape is required when no initial state is given")]
    MissingStateShape,

    /// Invalid annealer configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type alias for u-anneal operations.
pub type Result<T> = std::result::Result<T, AnnealError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_state_type_names_value() {
        let err = AnnealError::UnknownStateType("spin".into());
        assert_eq!(err.to_string(), "unknown state type \"spin\"");
    }

    #[test]
    fn test_index_error_message() {
        let err = AnnealError::IndexOutOfRange {
            index: vec![3, 0],
            shape: vec![2, 2],
        };
        assert_eq!(
            err.to_string(),
            "index [3, 0] out of range for shape [2, 2]"
        );
    }
}
