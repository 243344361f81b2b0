//! Coupling coefficients `(J, h, c)`.
//!
//! Callers supply coefficients in any of the forms of [`CouplingInput`]
//! and [`BiasInput`]; [`CouplingTensor::new`] normalizes them once into
//! the representation every energy evaluation uses.

mod input;
mod tensor;

pub use input::{BiasInput, CouplingInput};
pub use tensor::CouplingTensor;
