//! Single-replica Ising/QUBO model.

use super::config::{check_beta, ModelConfig};
use super::types::SpinModel;
use super::{check_state_shape, metropolis_accept, seeded_rng, AnnealRng};
use crate::coupling::{BiasInput, CouplingInput, CouplingTensor};
use crate::error::{AnnealError, Result};
use crate::state::ClassicalState;
use std::sync::Arc;
use tracing::trace;
use u_numflow::random::shuffle;

/// Coupling tensor, one classical state, inverse temperature and an owned
/// random source.
///
/// # Examples
///
/// ```
/// use u_anneal::model::{ClassicalModel, ModelConfig, SpinModel};
/// use u_anneal::state::StateType;
///
/// let config = ModelConfig::default()
///     .with_state_type(StateType::Ising)
///     .with_state_shape(vec![2])
///     .with_beta(f64::INFINITY)
///     .with_seed(7);
/// let mut model = ClassicalModel::new([[0.0, 1.0], [1.0, 0.0]], [0.0, 0.0], 0.0, &config).unwrap();
///
/// for _ in 0..3 {
///     model.update_state();
/// }
/// assert_eq!(model.energy(), -2.0);
/// ```
#[derive(Debug, Clone)]
pub struct ClassicalModel {
    tensor: Arc<CouplingTensor>,
    state: ClassicalState,
    beta: f64,
    rng: AnnealRng,
}

impl ClassicalModel {
    /// Builds a model with a random initial state of `config.state_shape`.
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
        let state = ClassicalState::random(shape, config.state_type, &mut rng)?;
        let tensor = CouplingTensor::new(j, h, c, state.shape())?;
        Ok(Self {
            tensor: Arc::new(tensor),
            state,
            beta: config.beta,
            rng,
        })
    }

    /// Builds a model around an explicit initial state.
    ///
    /// The state's own encoding is used; `config.state_shape`, when set,
    /// must equal the state's shape.
    pub fn with_state(
        j: impl Into<CouplingInput>,
        h: impl Into<BiasInput>,
        c: f64,
        state: ClassicalState,
        config: &ModelConfig,
    ) -> Result<Self> {
        config.validate()?;
        check_state_shape(config.state_shape.as_deref(), state.shape().dims())?;
        let tensor = CouplingTensor::new(j, h, c, state.shape())?;
        Ok(Self {
            tensor: Arc::new(tensor),
            state,
            beta: config.beta,
            rng: seeded_rng(config.seed),
        })
    }

    /// Builds a model from an already normalized tensor and an injected
    /// random source.
    pub fn from_parts(
        tensor: Arc<CouplingTensor>,
        state: ClassicalState,
        beta: f64,
        rng: AnnealRng,
    ) -> Result<Self> {
        check_beta(beta)?;
        if state.size() != tensor.size() {
            return Err(AnnealError::ShapeMismatch {
                expected: vec![tensor.size()],
                actual: state.shape().dims().to_vec(),
            });
        }
        Ok(Self {
            tensor,
            state,
            beta,
            rng,
        })
    }

    /// Evaluation-only model over a state known to match `tensor`.
    pub(crate) fn evaluator(tensor: Arc<CouplingTensor>, state: ClassicalState, beta: f64) -> Self {
        debug_assert_eq!(state.size(), tensor.size());
        Self {
            tensor,
            state,
            beta,
            rng: seeded_rng(Some(0)),
        }
    }

    pub fn tensor(&self) -> &CouplingTensor {
        &self.tensor
    }

    /// Shared handle to the tensor, for building sibling models.
    pub fn shared_tensor(&self) -> Arc<CouplingTensor> {
        Arc::clone(&self.tensor)
    }

    pub fn into_state(self) -> ClassicalState {
        self.state
    }

    /// Replaces the current state with one of the same size.
    pub fn set_state(&mut self, state: ClassicalState) -> Result<()> {
        if state.size() != self.tensor.size() {
            return Err(AnnealError::ShapeMismatch {
                expected: self.state.shape().dims().to_vec(),
                actual: state.shape().dims().to_vec(),
            });
        }
        self.state = state;
        Ok(())
    }

    /// Energy of a state already known to have `N` variables.
    pub(crate) fn energy_unchecked(&self, state: &ClassicalState) -> f64 {
        self.tensor.energy_of_values(state.as_slice())
    }

    /// Energy change of flipping flat variable `i` of the current state.
    fn flip_delta(&self, i: usize) -> f64 {
        let values = self.state.as_slice();
        let old = values[i];
        let new = self.state.encoding().flip(old);
        self.tensor
            .flip_delta(i, old as f64, new as f64, |k| values[k] as f64)
    }
}

impl SpinModel for ClassicalModel {
    type State = ClassicalState;

    const KIND: &'static str = "classical";

    fn state(&self) -> &ClassicalState {
        &self.state
    }

    /// `-x^T J x - h^T x - c` of the current state.
    fn energy(&self) -> f64 {
        self.energy_unchecked(&self.state)
    }

    fn energy_of(&self, state: &ClassicalState) -> Result<f64> {
        self.tensor.energy(state)
    }

    /// Same as the energy for a single replica.
    fn objective_value(&self) -> f64 {
        self.energy()
    }

    fn objective_value_of(&self, state: &ClassicalState) -> Result<f64> {
        self.energy_of(state)
    }

    /// One sweep over every variable in a fresh random order.
    fn update_state(&mut self) -> bool {
        let mut order: Vec<usize> = (0..self.state.size()).collect();
        shuffle(&mut order, &mut self.rng);

        let mut accepted = 0usize;
        for i in order {
            let delta = self.flip_delta(i);
            if metropolis_accept(delta, self.beta, &mut self.rng) {
                self.state.flip_flat(i);
                accepted += 1;
            }
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
}
