//! Annealing drivers.
//!
//! An [`Annealer`] owns one [`SpinModel`](crate::model::SpinModel) and
//! runs its Metropolis sweep a fixed number of times, optionally moving
//! `beta` and `gamma` along a [`Schedule`] between sweeps.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Kadowaki & Nishimori (1998), "Quantum annealing in the transverse Ising model"

mod config;
mod runner;

pub use config::{AnnealConfig, Schedule};
pub use runner::{AnnealSummary, Annealer, QuantumAnnealer, SimulatedAnnealer};
