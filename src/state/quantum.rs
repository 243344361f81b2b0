//! Replicated (Trotter) spin state.

use super::classical::ClassicalState;
use super::encoding::StateType;
use super::shape::Shape;
use crate::error::{AnnealError, Result};
use rand::Rng;
use std::fmt;

/// `n_trotter` replicas of a classical state sharing one shape and encoding.
///
/// Stored as one `(N, n_trotter)` row-major buffer: all replicas of
/// variable `i` are contiguous. Coordinates take the classical
/// coordinate followed by the replica index.
///
/// # Examples
///
/// ```
/// use u_anneal::state::{QuantumState, StateType};
/// use u_numflow::random::create_rng;
///
/// let mut rng = create_rng(3);
/// let mut state = QuantumState::random(vec![2, 3], 4, StateType::Qubo, &mut rng).unwrap();
/// assert_eq!(state.size(), 6);
/// assert_eq!(state.n_trotter(), 4);
///
/// let before = state.get(&[1, 2, 3]).unwrap();
/// state.flip_spins(&[[1, 2, 3]]).unwrap();
/// assert_eq!(state.get(&[1, 2, 3]).unwrap(), 1 - before);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantumState {
    encoding: StateType,
    shape: Shape,
    n_trotter: usize,
    values: Vec<i8>,
}

impl QuantumState {
    /// Draws every replica independently and uniformly.
    pub fn random<R: Rng>(
        shape: Vec<usize>,
        n_trotter: usize,
        encoding: StateType,
        rng: &mut R,
    ) -> Result<Self> {
        let shape = Shape::new(shape)?;
        let len = buffer_len(&shape, n_trotter)?;
        let values = (0..len)
            .map(|_| encoding.draw(rng))
            .collect();
        Ok(Self {
            encoding,
            shape,
            n_trotter,
            values,
        })
    }

    /// Wraps an explicit `(N, n_trotter)` buffer.
    pub fn from_values(
        shape: Vec<usize>,
        n_trotter: usize,
        encoding: StateType,
        values: Vec<i8>,
    ) -> Result<Self> {
        let shape = Shape::new(shape)?;
        if values.len() != buffer_len(&shape, n_trotter)? {
            let mut expected = shape.dims().to_vec();
            expected.push(n_trotter);
            return Err(AnnealError::ShapeMismatch {
                expected,
                actual: vec![values.len()],
            });
        }
        encoding.check_values(&values)?;
        Ok(Self {
            encoding,
            shape,
            n_trotter,
            values,
        })
    }

    /// Stacks classical states as replicas, in order.
    ///
    /// All layers must share shape and encoding.
    pub fn from_layers(layers: &[ClassicalState]) -> Result<Self> {
        let first = layers.first().ok_or_else(|| {
            AnnealError::InvalidArgument("at least one Trotter layer is required".into())
        })?;
        let n = first.size();
        let n_trotter = layers.len();
        for layer in layers {
            if layer.shape() != first.shape() {
                return Err(AnnealError::ShapeMismatch {
                    expected: first.shape().dims().to_vec(),
                    actual: layer.shape().dims().to_vec(),
                });
            }
            if layer.encoding() != first.encoding() {
                return Err(AnnealError::InvalidArgument(format!(
                    "mixed encodings: {} and {}",
                    first.encoding(),
                    layer.encoding()
                )));
            }
        }
        let mut values = vec![0i8; buffer_len(first.shape(), n_trotter)?];
        for (t, layer) in layers.iter().enumerate() {
            for (i, &v) in layer.as_slice().iter().enumerate() {
                values[i * n_trotter + t] = v;
            }
        }
        Ok(Self {
            encoding: first.encoding(),
            shape: first.shape().clone(),
            n_trotter,
            values,
        })
    }

    pub fn encoding(&self) -> StateType {
        self.encoding
    }

    /// Shape of one replica.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn n_trotter(&self) -> usize {
        self.n_trotter
    }

    /// Variable count `N` of one replica.
    pub fn size(&self) -> usize {
        self.shape.size()
    }

    /// The flat `(N, n_trotter)` buffer.
    pub fn as_slice(&self) -> &[i8] {
        &self.values
    }

    /// Value of flat variable `i` in replica `t`.
    #[inline]
    pub(crate) fn spin(&self, i: usize, t: usize) -> i8 {
        self.values[i * self.n_trotter + t]
    }

    #[inline]
    pub(crate) fn flip_flat(&mut self, i: usize, t: usize) {
        let k = i * self.n_trotter + t;
        self.values[k] = self.encoding.flip(self.values[k]);
    }

    fn offset(&self, index: &[usize]) -> Result<usize> {
        let (&t, classical) = index.split_last().ok_or_else(|| self.out_of_range(index))?;
        if t >= self.n_trotter {
            return Err(self.out_of_range(index));
        }
        let i = self
            .shape
            .ravel(classical)
            .map_err(|_| self.out_of_range(index))?;
        Ok(i * self.n_trotter + t)
    }

    fn out_of_range(&self, index: &[usize]) -> AnnealError {
        let mut shape = self.shape.dims().to_vec();
        shape.push(self.n_trotter);
        AnnealError::IndexOutOfRange {
            index: index.to_vec(),
            shape,
        }
    }

    /// Reads a value; the last coordinate selects the replica.
    pub fn get(&self, index: &[usize]) -> Result<i8> {
        Ok(self.values[self.offset(index)?])
    }

    pub fn set(&mut self, index: &[usize], value: i8) -> Result<()> {
        let k = self.offset(index)?;
        self.encoding.check_values(&[value])?;
        self.values[k] = value;
        Ok(())
    }

    /// Flips every listed `(coordinate.., replica)` position.
    ///
    /// All coordinates are validated before any flip is applied.
    pub fn flip_spins<I: AsRef<[usize]>>(&mut self, indices: &[I]) -> Result<()> {
        let offsets = indices
            .iter()
            .map(|idx| self.offset(idx.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        for k in offsets {
            self.values[k] = self.encoding.flip(self.values[k]);
        }
        Ok(())
    }

    /// Copies replica `idx` out as an independent classical state.
    pub fn trotter_layer(&self, idx: usize) -> Result<ClassicalState> {
        if idx >= self.n_trotter {
            return Err(AnnealError::IndexOutOfRange {
                index: vec![idx],
                shape: vec![self.n_trotter],
            });
        }
        Ok(self.layer_unchecked(idx))
    }

    pub(crate) fn layer_unchecked(&self, t: usize) -> ClassicalState {
        let values = (0..self.size()).map(|i| self.spin(i, t)).collect();
        ClassicalState::from_parts(self.encoding, self.shape.clone(), values)
    }

    /// Iterates over copies of every replica in order.
    pub fn layers(&self) -> impl Iterator<Item = ClassicalState> + '_ {
        (0..self.n_trotter).map(move |t| self.layer_unchecked(t))
    }
}

/// Length of the `(N, n_trotter)` buffer.
fn buffer_len(shape: &Shape, n_trotter: usize) -> Result<usize> {
    if n_trotter == 0 {
        return Err(AnnealError::InvalidArgument(
            "n_trotter must be at least 1".into(),
        ));
    }
    shape.size().checked_mul(n_trotter).ok_or_else(|| {
        AnnealError::InvalidArgument(format!(
            "{n_trotter} replicas of shape {shape} have too many elements"
        ))
    })
}

impl fmt::Display for QuantumState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}QuantumState(shape={}, n_trotter={})",
            self.encoding, self.shape, self.n_trotter
        )
    }
}
