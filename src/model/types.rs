//! Core trait for annealable spin models.

use crate::error::Result;

/// A spin model that an [`Annealer`](crate::anneal::Annealer) can drive.
///
/// The model owns its state, coefficients and random source. Each call
/// to [`update_state`](Self::update_state) runs one full Metropolis
/// sweep in place; the annealer only decides how many sweeps to run and
/// whether to adjust `beta`/`gamma` between them.
///
/// # Minimization
///
/// Energies follow `E = -x^T J x - h^T x - c` and are minimized.
pub trait SpinModel {
    /// State type the model evolves.
    type State: Clone;

    /// Short name used in logs.
    const KIND: &'static str;

    /// Current state.
    fn state(&self) -> &Self::State;

    /// Energy of the current state (the quantity the sweep minimizes).
    fn energy(&self) -> f64;

    /// Energy of an arbitrary state of matching shape.
    fn energy_of(&self, state: &Self::State) -> Result<f64>;

    /// Caller-facing score of the current state.
    fn objective_value(&self) -> f64;

    /// Caller-facing score of an arbitrary state of matching shape.
    fn objective_value_of(&self, state: &Self::State) -> Result<f64>;

    /// Runs one sweep. Returns whether any flip was accepted.
    fn update_state(&mut self) -> bool;

    fn beta(&self) -> f64;

    /// Replaces `beta`. Values that are not positive are ignored.
    fn set_beta(&mut self, beta: f64);

    /// Transverse-field strength, for models that have one.
    fn gamma(&self) -> Option<f64> {
        None
    }

    /// Replaces `gamma`. Models without a transverse field ignore it.
    fn set_gamma(&mut self, _gamma: f64) {}
}
