//! Model construction parameters.

use crate::error::{AnnealError, Result};
use crate::state::StateType;

/// Run parameters shared by [`ClassicalModel`](super::ClassicalModel) and
/// [`QuantumModel`](super::QuantumModel).
///
/// `gamma` and `n_trotter` are ignored by the classical model.
///
/// # Examples
///
/// ```
/// use u_anneal::model::ModelConfig;
/// use u_anneal::state::StateType;
///
/// let config = ModelConfig::default()
///     .with_state_type(StateType::Ising)
///     .with_state_shape(vec![8, 8])
///     .with_beta(10.0)
///     .with_gamma(2.0)
///     .with_n_trotter(8)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelConfig {
    /// Encoding of randomly initialized states.
    pub state_type: StateType,

    /// Shape of the (per-replica) state. Required unless an explicit
    /// initial state is supplied; must match it otherwise.
    pub state_shape: Option<Vec<usize>>,

    /// Inverse temperature. Must be positive; `f64::INFINITY` gives
    /// greedy descent.
    pub beta: f64,

    /// Transverse-field strength (quantum model only). Must be `>= 0`.
    pub gamma: f64,

    /// Number of Trotter replicas (quantum model only).
    pub n_trotter: usize,

    /// Random seed. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            state_type: StateType::Qubo,
            state_shape: None,
            beta: 1000.0,
            gamma: 1.0,
            n_trotter: 16,
            seed: None,
        }
    }
}

impl ModelConfig {
    pub fn with_state_type(mut self, state_type: StateType) -> Self {
        self.state_type = state_type;
        self
    }

    /// Sets the state type from its textual name (`"qubo"` / `"ising"`).
    pub fn with_state_type_name(mut self, name: &str) -> Result<Self> {
        self.state_type = name.parse()?;
        Ok(self)
    }

    pub fn with_state_shape(mut self, shape: Vec<usize>) -> Self {
        self.state_shape = Some(shape);
        self
    }

    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_n_trotter(mut self, n_trotter: usize) -> Self {
        self.n_trotter = n_trotter;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the numeric parameters.
    pub fn validate(&self) -> Result<()> {
        check_beta(self.beta)?;
        check_gamma(self.gamma)?;
        if self.n_trotter == 0 {
            return Err(AnnealError::InvalidArgument(
                "n_trotter must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

pub(crate) fn check_beta(beta: f64) -> Result<()> {
    if beta.is_nan() || beta <= 0.0 {
        return Err(AnnealError::InvalidArgument(format!(
            "beta must be positive, got {beta}"
        )));
    }
    Ok(())
}

pub(crate) fn check_gamma(gamma: f64) -> Result<()> {
    if !gamma.is_finite() || gamma < 0.0 {
        return Err(AnnealError::InvalidArgument(format!(
            "gamma must be finite and non-negative, got {gamma}"
        )));
    }
    Ok(())
}
