//! Ising/QUBO annealing.
//!
//! Formulates combinatorial problems as energy minimization over binary
//! spin variables and solves them by stochastic local search:
//!
//! - **Simulated annealing**: one replica, Metropolis single-spin flips at
//!   inverse temperature `beta` ([`ClassicalModel`]).
//! - **Path-integral quantum annealing**: `n_trotter` replicas coupled by a
//!   transverse-field term `gamma` ([`QuantumModel`]).
//!
//! Energies follow `E = -x^T J x - h^T x - c` with `x` in `{0, 1}` (QUBO) or
//! `{-1, +1}` (Ising).
//!
//! # Example
//!
//! ```
//! use u_anneal::{ClassicalModel, ModelConfig, SimulatedAnnealer, SpinModel};
//!
//! // Two spins that prefer to agree.
//! let config = ModelConfig::default()
//!     .with_state_type_name("ising")
//!     .unwrap()
//!     .with_state_shape(vec![2])
//!     .with_beta(f64::INFINITY)
//!     .with_seed(0);
//! let model = ClassicalModel::new([[0.0, 1.0], [1.0, 0.0]], [0.0, 0.0], 0.0, &config).unwrap();
//!
//! let mut annealer = SimulatedAnnealer::new(model);
//! annealer.anneal(5);
//! assert_eq!(annealer.model().energy(), -2.0);
//! ```
//!
//! # Architecture
//!
//! Coefficients are normalized once into a [`CouplingTensor`] (dense or
//! CSR) shared by every energy and flip-delta evaluation. Problem-specific
//! coefficient construction is left to callers.

pub mod anneal;
pub mod coupling;
pub mod error;
pub mod model;
pub mod state;

pub use anneal::{AnnealConfig, AnnealSummary, Annealer, QuantumAnnealer, Schedule, SimulatedAnnealer};
pub use coupling::{BiasInput, CouplingInput, CouplingTensor};
pub use error::{AnnealError, Result};
pub use model::{AnnealRng, ClassicalModel, ModelConfig, QuantumModel, SpinModel};
pub use state::{ClassicalState, QuantumState, Shape, StateType};
