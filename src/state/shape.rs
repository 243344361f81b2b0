//! Multi-dimensional shapes and their row-major flattening.

use crate::error::{AnnealError, Result};
use std::fmt;

/// A validated, non-empty shape with strictly positive dimensions whose
/// element count fits in `usize`.
///
/// Coordinates map to flat offsets in row-major order (last axis
/// fastest), the same order used for every state buffer.
///
/// # Examples
///
/// ```
/// use u_anneal::state::Shape;
///
/// let shape = Shape::new(vec![2, 3]).unwrap();
/// assert_eq!(shape.size(), 6);
/// assert_eq!(shape.ravel(&[1, 2]).unwrap(), 5);
/// assert_eq!(shape.unravel(5), vec![1, 2]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    dims: Vec<usize>,
    size: usize,
}

impl Shape {
    /// Creates a shape, rejecting empty shapes, zero dimensions and
    /// element counts that overflow `usize`.
    pub fn new(dims: Vec<usize>) -> Result<Self> {
        if dims.is_empty() {
            return Err(AnnealError::InvalidArgument(
                "shape must have at least one dimension".into(),
            ));
        }
        if dims.contains(&0) {
            return Err(AnnealError::InvalidArgument(format!(
                "shape {dims:?} has a zero dimension"
            )));
        }
        let size = dims
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or_else(|| {
                AnnealError::InvalidArgument(format!("shape {dims:?} has too many elements"))
            })?;
        Ok(Self { dims, size })
    }

    /// One-dimensional shape of length `n`.
    pub fn flat(n: usize) -> Result<Self> {
        Self::new(vec![n])
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Total number of elements.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Flat row-major offset of `index`.
    pub fn ravel(&self, index: &[usize]) -> Result<usize> {
        if index.len() != self.dims.len() {
            return Err(self.out_of_range(index));
        }
        let mut flat = 0usize;
        for (&i, &d) in index.iter().zip(&self.dims) {
            if i >= d {
                return Err(self.out_of_range(index));
            }
            flat = flat * d + i;
        }
        Ok(flat)
    }

    /// Inverse of [`ravel`](Self::ravel). `flat` must be below `size()`.
    pub fn unravel(&self, mut flat: usize) -> Vec<usize> {
        let mut index = vec![0; self.dims.len()];
        for (slot, &d) in index.iter_mut().zip(&self.dims).rev() {
            *slot = flat % d;
            flat /= d;
        }
        index
    }

    fn out_of_range(&self, index: &[usize]) -> AnnealError {
        AnnealError::IndexOutOfRange {
            index: index.to_vec(),
            shape: self.dims.clone(),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (k, d) in self.dims.iter().enumerate() {
            if k > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, ")")
    }
}
