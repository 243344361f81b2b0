//! Single-replica spin state.

use super::encoding::StateType;
use super::shape::Shape;
use crate::error::{AnnealError, Result};
use rand::Rng;
use std::fmt;

/// A flat buffer of `N` spin values carrying a caller-meaningful shape.
///
/// The encoding is fixed for the lifetime of the state. Indexed access
/// uses full coordinates in `shape`, flattened row-major.
///
/// # Examples
///
/// ```
/// use u_anneal::state::{ClassicalState, StateType};
///
/// let mut state = ClassicalState::from_values(vec![2, 2], StateType::Ising, vec![1, 1, -1, 1]).unwrap();
/// assert_eq!(state.get(&[1, 0]).unwrap(), -1);
///
/// state.flip_spins(&[[1, 0], [0, 1]]).unwrap();
/// assert_eq!(state.as_slice(), &[1, -1, 1, 1]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassicalState {
    encoding: StateType,
    shape: Shape,
    values: Vec<i8>,
}

impl ClassicalState {
    /// Draws a uniformly random state of the given shape.
    pub fn random<R: Rng>(shape: Vec<usize>, encoding: StateType, rng: &mut R) -> Result<Self> {
        let shape = Shape::new(shape)?;
        let values = (0..shape.size()).map(|_| encoding.draw(rng)).collect();
        Ok(Self {
            encoding,
            shape,
            values,
        })
    }

    /// Wraps explicit values (row-major) after checking size and domain.
    pub fn from_values(shape: Vec<usize>, encoding: StateType, values: Vec<i8>) -> Result<Self> {
        let shape = Shape::new(shape)?;
        if values.len() != shape.size() {
            return Err(AnnealError::ShapeMismatch {
                expected: shape.dims().to_vec(),
                actual: vec![values.len()],
            });
        }
        encoding.check_values(&values)?;
        Ok(Self {
            encoding,
            shape,
            values,
        })
    }

    /// Builds a state from pre-validated parts.
    pub(crate) fn from_parts(encoding: StateType, shape: Shape, values: Vec<i8>) -> Self {
        debug_assert_eq!(values.len(), shape.size());
        Self {
            encoding,
            shape,
            values,
        }
    }

    pub fn encoding(&self) -> StateType {
        self.encoding
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Total variable count `N`.
    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// The flat row-major buffer.
    pub fn as_slice(&self) -> &[i8] {
        &self.values
    }

    pub fn get(&self, index: &[usize]) -> Result<i8> {
        Ok(self.values[self.shape.ravel(index)?])
    }

    /// Sets a value; it must belong to the state's encoding.
    pub fn set(&mut self, index: &[usize], value: i8) -> Result<()> {
        let flat = self.shape.ravel(index)?;
        self.encoding.check_values(&[value])?;
        self.values[flat] = value;
        Ok(())
    }

    /// Flips every listed coordinate.
    ///
    /// All coordinates are validated first; on error nothing is flipped.
    /// Listing a coordinate twice flips it twice.
    pub fn flip_spins<I: AsRef<[usize]>>(&mut self, indices: &[I]) -> Result<()> {
        let flat = indices
            .iter()
            .map(|idx| self.shape.ravel(idx.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        for i in flat {
            self.flip_flat(i);
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn flip_flat(&mut self, i: usize) {
        self.values[i] = self.encoding.flip(self.values[i]);
    }

    /// Returns a copy viewed under a different shape of the same size.
    pub fn reshape(&self, shape: Vec<usize>) -> Result<Self> {
        let shape = Shape::new(shape)?;
        if shape.size() != self.size() {
            return Err(AnnealError::ShapeMismatch {
                expected: vec![self.size()],
                actual: shape.dims().to_vec(),
            });
        }
        Ok(Self {
            encoding: self.encoding,
            shape,
            values: self.values.clone(),
        })
    }

    /// Returns a copy re-encoded as `target`.
    pub fn to_encoding(&self, target: StateType) -> Self {
        Self {
            encoding: target,
            shape: self.shape.clone(),
            values: self
                .values
                .iter()
                .map(|&v| self.encoding.convert(v, target))
                .collect(),
        }
    }

    /// Bipolar (Ising) copy of this state.
    pub fn to_ising(&self) -> Self {
        self.to_encoding(StateType::Ising)
    }

    /// Binary (QUBO) copy of this state.
    pub fn to_qubo(&self) -> Self {
        self.to_encoding(StateType::Qubo)
    }
}

impl fmt::Display for ClassicalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}State(shape={}, values={:?})", self.encoding, self.shape, self.values)
    }
}
