//! Path-integral (Trotter-replicated) Ising/QUBO model.
//!
//! The transverse field `gamma` is mapped onto a ferromagnetic coupling
//! between the same variable in adjacent replicas (periodic along the
//! Trotter axis):
//!
//! ```text
//! coeff = -ln(tanh(beta * gamma / n_trotter)) / (2 * beta)
//! E_q   = -coeff * sum_i sum_t s(i, t) * s(i, t + 1)
//! ```
//!
//! where `s` is the bipolar value of each spin. The total energy is the
//! mean classical energy over replicas plus `E_q`.

use super::classical::ClassicalModel;
use super::config::{check_beta, check_gamma, ModelConfig};
use super::types::SpinModel;
use super::{check_state_shape, metropolis_accept, seeded_rng, AnnealRng};
use crate::coupling::{BiasInput, CouplingInput, CouplingTensor};
use crate::error::{AnnealError, Result};
use crate::state::{ClassicalState, QuantumState};
use rand::Rng;
use std::sync::Arc;
use tracing::trace;
use u_numflow::random::shuffle;

/// Coupling tensor, a replicated state, `beta`, `gamma` and an owned
/// random source.
///
/// # Examples
///
/// ```
/// use u_anneal::model::{ModelConfig, QuantumModel, SpinModel};
///
/// let config = ModelConfig::default()
///     .with_state_shape(vec![3])
///     .with_n_trotter(4)
///     .with_beta(5.0)
///     .with_gamma(1.0)
///     .with_seed(1);
/// let j = vec![vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0], vec![0.0, 0.0, 0.0]];
/// let mut model = QuantumModel::new(j, vec![0.0; 3], 0.0, &config).unwrap();
///
/// for _ in 0..10 {
///     model.update_state();
/// }
/// let best = model.observe_best();
/// assert_eq!(best.size(), 3);
/// assert!(model.objective_value() <= model.classical_energy());
/// ```
#[derive(Debug, Clone)]
pub struct QuantumModel {
    tensor: Arc<CouplingTensor>,
    state: QuantumState,
    beta: f64,
    gamma: f64,
    rng: AnnealRng,
}

impl QuantumModel {
    /// Builds a model with `config.n_trotter` random replicas of
    /// `config.state_shape`.
    pub fn new(
        j: impl Into<CouplingInput>,
        h: impl Into<BiasInput>,
        c: f64,
        config: &ModelConfig,
    ) -> Result<Self> {
        config.validate()?;
        let shape = config
            .state_shape
            .clone()
            .ok_or(AnnealError::MissingStateShape)?;
        let mut rng = seeded_rng(config.seed);
        let state = QuantumState::random(shape, config.n_trotter, config.state_type, &mut rng)?;
        let tensor = CouplingTensor::new(j, h, c, state.shape())?;
        Ok(Self {
            tensor: Arc::new(tensor),
            state,
            beta: config.beta,
            gamma: config.gamma,
            rng,
        })
    }

    /// Builds a model around an explicit replicated state.
    ///
    /// The replica count and encoding come from the state;
    /// `config.n_trotter` and `config.state_type` are ignored.
    pub fn with_state(
        j: impl Into<CouplingInput>,
        h: impl Into<BiasInput>,
        c: f64,
        state: QuantumState,
        config: &ModelConfig,
    ) -> Result<Self> {
        check_beta(config.beta)?;
        check_gamma(config.gamma)?;
        check_state_shape(config.state_shape.as_deref(), state.shape().dims())?;
        let tensor = CouplingTensor::new(j, h, c, state.shape())?;
        Ok(Self {
            tensor: Arc::new(tensor),
            state,
            beta: config.beta,
            gamma: config.gamma,
            rng: seeded_rng(config.seed),
        })
    }

    /// Builds a model from an already normalized tensor and an injected
    /// random source.
    pub fn from_parts(
        tensor: Arc<CouplingTensor>,
        state: QuantumState,
        beta: f64,
        gamma: f64,
        rng: AnnealRng,
    ) -> Result<Self> {
        check_beta(beta)?;
        check_gamma(gamma)?;
        if state.size() != tensor.size() {
            return Err(AnnealError::ShapeMismatch {
                expected: vec![tensor.size(), state.n_trotter()],
                actual: vec![state.size(), state.n_trotter()],
            });
        }
        Ok(Self {
            tensor,
            state,
            beta,
            gamma,
            rng,
        })
    }

    pub fn tensor(&self) -> &CouplingTensor {
        &self.tensor
    }

    pub fn n_trotter(&self) -> usize {
        self.state.n_trotter()
    }

    pub fn into_state(self) -> QuantumState {
        self.state
    }

    /// Inter-replica coupling strength for the current `beta`/`gamma`.
    ///
    /// Zero for a single replica. `beta * gamma` is clamped to
    /// `f64::EPSILON` and `tanh` to the smallest positive value, so the
    /// result stays finite even when `gamma == 0`.
    pub fn quantum_coefficient(&self) -> f64 {
        let n_trotter = self.n_trotter();
        if n_trotter == 1 {
            return 0.0;
        }
        let beta_gamma = (self.beta * self.gamma).max(f64::EPSILON);
        let t = (beta_gamma / n_trotter as f64).tanh().max(f64::MIN_POSITIVE);
        -t.ln() / (2.0 * self.beta)
    }

    fn check_compatible(&self, state: &QuantumState) -> Result<()> {
        if state.size() != self.tensor.size() || state.n_trotter() != self.n_trotter() {
            return Err(AnnealError::ShapeMismatch {
                expected: vec![self.tensor.size(), self.n_trotter()],
                actual: vec![state.size(), state.n_trotter()],
            });
        }
        Ok(())
    }

    fn layer_energy(&self, state: &QuantumState, t: usize) -> f64 {
        self.tensor.energy_with(|i| state.spin(i, t) as f64)
    }

    fn classical_energy_unchecked(&self, state: &QuantumState) -> f64 {
        let n_trotter = state.n_trotter();
        let total: f64 = (0..n_trotter).map(|t| self.layer_energy(state, t)).sum();
        total / n_trotter as f64
    }

    fn quantum_energy_unchecked(&self, state: &QuantumState) -> f64 {
        let n_trotter = state.n_trotter();
        if n_trotter == 1 {
            return 0.0;
        }
        let encoding = state.encoding();
        let mut alignment = 0i64;
        for i in 0..state.size() {
            for t in 0..n_trotter {
                let s = encoding.bipolar(state.spin(i, t));
                let next = encoding.bipolar(state.spin(i, (t + 1) % n_trotter));
                alignment += i64::from(s * next);
            }
        }
        -self.quantum_coefficient() * alignment as f64
    }

    fn objective_unchecked(&self, state: &QuantumState) -> f64 {
        (0..state.n_trotter())
            .map(|t| self.layer_energy(state, t))
            .fold(f64::INFINITY, f64::min)
    }

    /// Mean classical energy over replicas of the current state.
    pub fn classical_energy(&self) -> f64 {
        self.classical_energy_unchecked(&self.state)
    }

    pub fn classical_energy_of(&self, state: &QuantumState) -> Result<f64> {
        self.check_compatible(state)?;
        Ok(self.classical_energy_unchecked(state))
    }

    /// Inter-replica energy of the current state; zero for one replica.
    pub fn quantum_energy(&self) -> f64 {
        self.quantum_energy_unchecked(&self.state)
    }

    pub fn quantum_energy_of(&self, state: &QuantumState) -> Result<f64> {
        self.check_compatible(state)?;
        Ok(self.quantum_energy_unchecked(state))
    }

    /// Total energy change of flipping variable `i` in replica `t`.
    ///
    /// The replica's classical energy enters the mean with weight
    /// `1 / n_trotter`; the flip also changes its alignment with replicas
    /// `t - 1` and `t + 1`.
    fn flip_delta(&self, i: usize, t: usize, coeff: f64) -> f64 {
        let state = &self.state;
        let n_trotter = state.n_trotter();
        let encoding = state.encoding();
        let old = state.spin(i, t);
        let new = encoding.flip(old);
        let classical = self
            .tensor
            .flip_delta(i, old as f64, new as f64, |k| state.spin(k, t) as f64)
            / n_trotter as f64;
        if n_trotter == 1 {
            return classical;
        }
        let prev = state.spin(i, (t + n_trotter - 1) % n_trotter);
        let next = state.spin(i, (t + 1) % n_trotter);
        let neighbors = encoding.bipolar(prev) + encoding.bipolar(next);
        let quantum = 2.0 * coeff * f64::from(encoding.bipolar(old) * neighbors);
        classical + quantum
    }

    fn update_layer(&mut self, t: usize, coeff: f64) -> usize {
        let mut order: Vec<usize> = (0..self.state.size()).collect();
        shuffle(&mut order, &mut self.rng);

        let mut accepted = 0usize;
        for i in order {
            let delta = self.flip_delta(i, t, coeff);
            if metropolis_accept(delta, self.beta, &mut self.rng) {
                self.state.flip_flat(i, t);
                accepted += 1;
            }
        }
        accepted
    }

    /// One uniformly chosen replica of the current state.
    pub fn observe(&mut self) -> ClassicalState {
        let t = self.rng.random_range(0..self.n_trotter());
        self.state.layer_unchecked(t)
    }

    /// The replica with the lowest standalone classical energy; ties go
    /// to the lowest replica index.
    pub fn observe_best(&self) -> ClassicalState {
        let first = self.state.layer_unchecked(0);
        let evaluator = ClassicalModel::evaluator(Arc::clone(&self.tensor), first, self.beta);

        // `None` keeps the first replica, which the evaluator holds.
        let mut best: Option<ClassicalState> = None;
        let mut best_energy = evaluator.energy();
        for layer in self.state.layers().skip(1) {
            let energy = evaluator.energy_unchecked(&layer);
            if energy < best_energy {
                best_energy = energy;
                best = Some(layer);
            }
        }
        best.unwrap_or_else(|| evaluator.into_state())
    }
}

impl SpinModel for QuantumModel {
    type State = QuantumState;

    const KIND: &'static str = "quantum";

    fn state(&self) -> &QuantumState {
        &self.state
    }

    /// `classical_energy + quantum_energy`.
    fn energy(&self) -> f64 {
        self.classical_energy() + self.quantum_energy()
    }

    fn energy_of(&self, state: &QuantumState) -> Result<f64> {
        self.check_compatible(state)?;
        Ok(self.classical_energy_unchecked(state) + self.quantum_energy_unchecked(state))
    }

    /// Lowest standalone classical energy over replicas.
    fn objective_value(&self) -> f64 {
        self.objective_unchecked(&self.state)
    }

    fn objective_value_of(&self, state: &QuantumState) -> Result<f64> {
        self.check_compatible(state)?;
        Ok(self.objective_unchecked(state))
    }

    /// One sweep of every replica, replicas visited in random order.
    fn update_state(&mut self) -> bool {
        let coeff = self.quantum_coefficient();
        let mut layers: Vec<usize> = (0..self.n_trotter()).collect();
        shuffle(&mut layers, &mut self.rng);

        let mut accepted = 0usize;
        for t in layers {
            accepted += self.update_layer(t, coeff);
        }
        trace!(event = "sweep", model = Self::KIND, accepted = accepted);
        accepted > 0
    }

    fn beta(&self) -> f64 {
        self.beta
    }

    fn set_beta(&mut self, beta: f64) {
        if check_beta(beta).is_ok() {
            self.beta = beta;
        }
    }

    fn gamma(&self) -> Option<f64> {
        Some(self.gamma)
    }

    fn set_gamma(&mut self, gamma: f64) {
        if check_gamma(gamma).is_ok() {
            self.gamma = gamma;
        }
    }
}
