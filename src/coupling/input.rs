//! Accepted input forms for coupling and bias coefficients.

use std::collections::{BTreeMap, HashMap};

/// Pairwise coupling `J` as supplied by the caller.
///
/// Normalized exactly once by
/// [`CouplingTensor::new`](super::CouplingTensor::new).
#[derive(Debug, Clone, PartialEq)]
pub enum CouplingInput {
    /// Coordinate-keyed weights. Each key is the row coordinate followed
    /// by the column coordinate, both in the state's shape (so a key has
    /// `2 * ndim` components).
    Map(HashMap<Vec<usize>, f64>),
    /// Dense `N x N` rows.
    Nested(Vec<Vec<f64>>),
    /// Dense row-major array of `N * N` weights (any caller shape whose
    /// element count is `N * N`).
    Array(Vec<f64>),
}

impl From<HashMap<Vec<usize>, f64>> for CouplingInput {
    fn from(map: HashMap<Vec<usize>, f64>) -> Self {
        CouplingInput::Map(map)
    }
}

impl From<BTreeMap<Vec<usize>, f64>> for CouplingInput {
    fn from(map: BTreeMap<Vec<usize>, f64>) -> Self {
        CouplingInput::Map(map.into_iter().collect())
    }
}

impl From<Vec<Vec<f64>>> for CouplingInput {
    fn from(rows: Vec<Vec<f64>>) -> Self {
        CouplingInput::Nested(rows)
    }
}

impl From<Vec<f64>> for CouplingInput {
    fn from(values: Vec<f64>) -> Self {
        CouplingInput::Array(values)
    }
}

impl<const N: usize> From<[[f64; N]; N]> for CouplingInput {
    fn from(rows: [[f64; N]; N]) -> Self {
        CouplingInput::Nested(rows.iter().map(|r| r.to_vec()).collect())
    }
}

/// Linear bias `h` as supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum BiasInput {
    /// Coordinate-keyed biases; keys are coordinates in the state's shape.
    /// Missing coordinates are zero.
    Map(HashMap<Vec<usize>, f64>),
    /// Dense row-major array of `N` biases.
    Array(Vec<f64>),
}

impl BiasInput {
    /// All-zero bias.
    pub fn zeros() -> Self {
        BiasInput::Map(HashMap::new())
    }
}

impl From<HashMap<Vec<usize>, f64>> for BiasInput {
    fn from(map: HashMap<Vec<usize>, f64>) -> Self {
        BiasInput::Map(map)
    }
}

impl From<BTreeMap<Vec<usize>, f64>> for BiasInput {
    fn from(map: BTreeMap<Vec<usize>, f64>) -> Self {
        BiasInput::Map(map.into_iter().collect())
    }
}

impl From<Vec<f64>> for BiasInput {
    fn from(values: Vec<f64>) -> Self {
        BiasInput::Array(values)
    }
}

impl<const N: usize> From<[f64; N]> for BiasInput {
    fn from(values: [f64; N]) -> Self {
        BiasInput::Array(values.to_vec())
    }
}
