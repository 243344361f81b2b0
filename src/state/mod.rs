//! Spin states.
//!
//! A [`ClassicalState`] is one flat buffer of binary variables viewed
//! under a caller-defined [`Shape`]; a [`QuantumState`] stacks
//! `n_trotter` such replicas for path-integral annealing. Both are
//! encoded either as QUBO (`{0, 1}`) or Ising (`{-1, +1}`) values, see
//! [`StateType`].

mod classical;
mod encoding;
mod quantum;
mod shape;

pub use classical::ClassicalState;
pub use encoding::StateType;
pub use quantum::QuantumState;
pub use shape::Shape;
