//! Canonical coupling tensor and its energy kernels.
//!
//! The energy of a state `x` is `-x^T J x - h^T x - c`. Internally the
//! tensor keeps the symmetrized matrix `S = J + J^T` plus the diagonal of
//! `J`, which gives both evaluation paths from one representation:
//!
//! - full energy: `-(1/2) x^T S x - h^T x - c`
//! - flipping variable `i` by `d = x_i' - x_i`:
//!   `dE = -d (S x)_i - d^2 J_ii - d h_i`
//!
//! `S` is stored either dense or as CSR; the hot path never looks at the
//! caller's original container again.

use super::input::{BiasInput, CouplingInput};
use crate::error::{AnnealError, Result};
use crate::state::{ClassicalState, Shape};
use std::collections::BTreeMap;
use tracing::debug;

/// Dense inputs whose symmetrized density is at or below this fraction
/// are stored as CSR.
const SPARSE_DENSITY: f64 = 0.25;

#[derive(Debug, Clone, PartialEq)]
struct Csr {
    row_ptr: Vec<usize>,
    cols: Vec<usize>,
    values: Vec<f64>,
}

impl Csr {
    fn from_entries(n: usize, entries: &BTreeMap<(usize, usize), f64>) -> Self {
        let mut row_ptr = vec![0usize; n + 1];
        let mut cols = Vec::with_capacity(entries.len());
        let mut values = Vec::with_capacity(entries.len());
        // BTreeMap iterates in (row, col) order.
        for (&(r, c), &w) in entries {
            if w != 0.0 {
                row_ptr[r + 1] += 1;
                cols.push(c);
                values.push(w);
            }
        }
        for r in 0..n {
            row_ptr[r + 1] += row_ptr[r];
        }
        Self {
            row_ptr,
            cols,
            values,
        }
    }

    fn from_dense(n: usize, dense: &[f64]) -> Self {
        let mut row_ptr = Vec::with_capacity(n + 1);
        let mut cols = Vec::new();
        let mut values = Vec::new();
        row_ptr.push(0);
        for r in 0..n {
            for (c, &w) in dense[r * n..(r + 1) * n].iter().enumerate() {
                if w != 0.0 {
                    cols.push(c);
                    values.push(w);
                }
            }
            row_ptr.push(cols.len());
        }
        Self {
            row_ptr,
            cols,
            values,
        }
    }

    #[inline]
    fn row(&self, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let span = self.row_ptr[i]..self.row_ptr[i + 1];
        self.cols[span.clone()]
            .iter()
            .copied()
            .zip(self.values[span].iter().copied())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Couplings {
    Dense(Vec<f64>),
    Sparse(Csr),
}

/// Immutable, normalized coefficients `(J, h, c)` over `N` variables.
///
/// # Examples
///
/// ```
/// use u_anneal::coupling::CouplingTensor;
/// use u_anneal::state::{ClassicalState, Shape, StateType};
///
/// let shape = Shape::flat(2).unwrap();
/// let tensor = CouplingTensor::new([[0.0, 1.0], [1.0, 0.0]], [0.0, 0.0], 0.0, &shape).unwrap();
///
/// let aligned = ClassicalState::from_values(vec![2], StateType::Ising, vec![1, 1]).unwrap();
/// assert_eq!(tensor.energy(&aligned).unwrap(), -2.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CouplingTensor {
    n: usize,
    couplings: Couplings,
    diagonal: Vec<f64>,
    bias: Vec<f64>,
    offset: f64,
}

impl CouplingTensor {
    /// Normalizes caller coefficients for states of the given shape.
    ///
    /// Coordinate maps become CSR. Dense inputs stay dense unless they
    /// are sparse enough to benefit from CSR.
    pub fn new(
        j: impl Into<CouplingInput>,
        h: impl Into<BiasInput>,
        c: f64,
        shape: &Shape,
    ) -> Result<Self> {
        let n = shape.size();
        if !c.is_finite() {
            return Err(AnnealError::InvalidArgument(format!(
                "offset c must be finite, got {c}"
            )));
        }

        let mut diagonal = vec![0.0; n];
        let couplings = match j.into() {
            CouplingInput::Map(map) => {
                let ndim = shape.ndim();
                let mut entries = BTreeMap::new();
                for (key, &w) in &map {
                    if key.len() != 2 * ndim {
                        return Err(AnnealError::InvalidArgument(format!(
                            "coupling key {key:?} must have {} components",
                            2 * ndim
                        )));
                    }
                    check_finite(w)?;
                    let r = shape.ravel(&key[..ndim])?;
                    let col = shape.ravel(&key[ndim..])?;
                    *entries.entry((r, col)).or_insert(0.0) += w;
                    *entries.entry((col, r)).or_insert(0.0) += w;
                    if r == col {
                        diagonal[r] += w;
                    }
                }
                Couplings::Sparse(Csr::from_entries(n, &entries))
            }
            CouplingInput::Nested(rows) => {
                if rows.len() != n || rows.iter().any(|r| r.len() != n) {
                    return Err(AnnealError::InvalidArgument(format!(
                        "nested coupling must be {n} x {n}"
                    )));
                }
                let flat: Vec<f64> = rows.into_iter().flatten().collect();
                symmetrize_dense(n, &flat, &mut diagonal)?
            }
            CouplingInput::Array(flat) => {
                let len = n.checked_mul(n).ok_or_else(|| {
                    AnnealError::InvalidArgument(format!(
                        "dense coupling over {n} variables has too many elements"
                    ))
                })?;
                if flat.len() != len {
                    return Err(AnnealError::InvalidArgument(format!(
                        "dense coupling must have {len} elements, got {}",
                        flat.len()
                    )));
                }
                symmetrize_dense(n, &flat, &mut diagonal)?
            }
        };

        let bias = match h.into() {
            BiasInput::Map(map) => {
                let mut bias = vec![0.0; n];
                for (key, &w) in &map {
                    check_finite(w)?;
                    bias[shape.ravel(key)?] += w;
                }
                bias
            }
            BiasInput::Array(values) => {
                if values.len() != n {
                    return Err(AnnealError::InvalidArgument(format!(
                        "bias must have {n} elements, got {}",
                        values.len()
                    )));
                }
                values.iter().try_for_each(|&w| check_finite(w))?;
                values
            }
        };

        let tensor = Self {
            n,
            couplings,
            diagonal,
            bias,
            offset: c,
        };
        debug!(
            event = "normalize",
            n = tensor.n,
            nnz = tensor.nnz(),
            sparse = tensor.is_sparse()
        );
        Ok(tensor)
    }

    /// Number of variables `N`.
    pub fn size(&self) -> usize {
        self.n
    }

    /// Stored non-zeros of the symmetrized coupling matrix.
    pub fn nnz(&self) -> usize {
        match &self.couplings {
            Couplings::Dense(s) => s.iter().filter(|&&w| w != 0.0).count(),
            Couplings::Sparse(csr) => csr.values.len(),
        }
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self.couplings, Couplings::Sparse(_))
    }

    pub fn bias(&self) -> &[f64] {
        &self.bias
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Energy of a classical state with `N` variables.
    pub fn energy(&self, state: &ClassicalState) -> Result<f64> {
        if state.size() != self.n {
            return Err(AnnealError::ShapeMismatch {
                expected: vec![self.n],
                actual: state.shape().dims().to_vec(),
            });
        }
        Ok(self.energy_of_values(state.as_slice()))
    }

    pub(crate) fn energy_of_values(&self, values: &[i8]) -> f64 {
        self.energy_with(|j| values[j] as f64)
    }

    /// Full energy with variable values supplied by `value`.
    pub(crate) fn energy_with<F: Fn(usize) -> f64>(&self, value: F) -> f64 {
        let mut quadratic = 0.0;
        let mut linear = 0.0;
        for i in 0..self.n {
            let x = value(i);
            if x != 0.0 {
                quadratic += x * self.local_field(i, &value);
                linear += self.bias[i] * x;
            }
        }
        -0.5 * quadratic - linear - self.offset
    }

    /// `(S x)_i`.
    #[inline]
    pub(crate) fn local_field<F: Fn(usize) -> f64>(&self, i: usize, value: F) -> f64 {
        match &self.couplings {
            Couplings::Dense(s) => s[i * self.n..(i + 1) * self.n]
                .iter()
                .enumerate()
                .map(|(j, &w)| w * value(j))
                .sum(),
            Couplings::Sparse(csr) => csr.row(i).map(|(j, w)| w * value(j)).sum(),
        }
    }

    /// Energy change from moving variable `i` from `old` to `new`, all
    /// other values as given by `value` (which still reports `old` at `i`).
    #[inline]
    pub(crate) fn flip_delta<F: Fn(usize) -> f64>(
        &self,
        i: usize,
        old: f64,
        new: f64,
        value: F,
    ) -> f64 {
        let d = new - old;
        -d * self.local_field(i, value) - d * d * self.diagonal[i] - d * self.bias[i]
    }

    fn row_sums(&self) -> Vec<f64> {
        (0..self.n).map(|i| self.local_field(i, |_| 1.0)).collect()
    }

    fn total_coupling(&self) -> f64 {
        // sum(J) = sum(S) / 2
        0.5 * self.row_sums().iter().sum::<f64>()
    }

    fn scaled(&self, factor: f64, bias: Vec<f64>, offset: f64) -> Self {
        let couplings = match &self.couplings {
            Couplings::Dense(s) => Couplings::Dense(s.iter().map(|w| w * factor).collect()),
            Couplings::Sparse(csr) => Couplings::Sparse(Csr {
                row_ptr: csr.row_ptr.clone(),
                cols: csr.cols.clone(),
                values: csr.values.iter().map(|w| w * factor).collect(),
            }),
        };
        Self {
            n: self.n,
            couplings,
            diagonal: self.diagonal.iter().map(|w| w * factor).collect(),
            bias,
            offset,
        }
    }

    /// Coefficients of the equivalent Ising problem.
    ///
    /// Treating `self` as a QUBO tensor, the returned tensor gives every
    /// bipolar state `s = 2x - 1` the same energy that `self` gives `x`.
    pub fn to_ising(&self) -> Self {
        let rows = self.row_sums();
        let bias = self
            .bias
            .iter()
            .zip(&rows)
            .map(|(h, r)| 0.5 * h + 0.25 * r)
            .collect();
        let offset =
            self.offset + 0.25 * self.total_coupling() + 0.5 * self.bias.iter().sum::<f64>();
        self.scaled(0.25, bias, offset)
    }

    /// Coefficients of the equivalent QUBO problem; inverse of
    /// [`to_ising`](Self::to_ising).
    pub fn to_qubo(&self) -> Self {
        let rows = self.row_sums();
        let bias = self
            .bias
            .iter()
            .zip(&rows)
            .map(|(h, r)| 2.0 * h - 2.0 * r)
            .collect();
        let offset = self.offset + self.total_coupling() - self.bias.iter().sum::<f64>();
        self.scaled(4.0, bias, offset)
    }
}

fn check_finite(w: f64) -> Result<()> {
    if w.is_finite() {
        Ok(())
    } else {
        Err(AnnealError::InvalidArgument(format!(
            "coefficients must be finite, got {w}"
        )))
    }
}

fn symmetrize_dense(n: usize, j: &[f64], diagonal: &mut [f64]) -> Result<Couplings> {
    j.iter().try_for_each(|&w| check_finite(w))?;
    let mut s = vec![0.0; n * n];
    let mut nnz = 0usize;
    for r in 0..n {
        diagonal[r] = j[r * n + r];
        for c in 0..n {
            let w = j[r * n + c] + j[c * n + r];
            if w != 0.0 {
                nnz += 1;
            }
            s[r * n + c] = w;
        }
    }
    if (nnz as f64) <= SPARSE_DENSITY * (n * n) as f64 {
        Ok(Couplings::Sparse(Csr::from_dense(n, &s)))
    } else {
        Ok(Couplings::Dense(s))
    }
}
