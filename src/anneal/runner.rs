//! Annealing loop.

use super::config::AnnealConfig;
use crate::error::Result;
use crate::model::{ClassicalModel, QuantumModel, SpinModel};
use tracing::{debug, info};

/// Outcome of one [`Annealer::anneal`] call.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnealSummary {
    /// Sweeps performed by this call.
    pub iterations: usize,

    /// Sweeps in which at least one flip was accepted.
    pub accepted_sweeps: usize,

    /// Model energy before the first sweep.
    pub initial_energy: f64,

    /// Model energy after the last sweep.
    pub final_energy: f64,

    /// Model objective after the last sweep.
    pub final_objective: f64,

    /// Objective sampled every `history_interval` sweeps, starting with
    /// the value before the first sweep. Empty when sampling is disabled.
    pub objective_history: Vec<f64>,
}

/// Drives a [`SpinModel`] through a fixed number of sweeps.
///
/// # Examples
///
/// ```
/// use u_anneal::anneal::SimulatedAnnealer;
/// use u_anneal::model::{ClassicalModel, ModelConfig, SpinModel};
///
/// let config = ModelConfig::default()
///     .with_state_shape(vec![3])
///     .with_beta(f64::INFINITY)
///     .with_seed(5);
/// let j = vec![vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0], vec![0.0, 0.0, 0.0]];
/// let model = ClassicalModel::new(j, vec![1.0; 3], 0.0, &config).unwrap();
///
/// let mut annealer = SimulatedAnnealer::new(model);
/// let summary = annealer.anneal(10);
/// assert_eq!(annealer.iter_count(), 10);
/// assert!(summary.final_energy <= summary.initial_energy);
/// ```
#[derive(Debug, Clone)]
pub struct Annealer<M: SpinModel> {
    model: M,
    config: AnnealConfig,
    iter_count: usize,
    remaining: usize,
}

/// Annealer over a single-replica model.
pub type SimulatedAnnealer = Annealer<ClassicalModel>;

/// Annealer over a Trotter-replicated model.
pub type QuantumAnnealer = Annealer<QuantumModel>;

impl<M: SpinModel> Annealer<M> {
    /// Wraps `model` with constant `beta`/`gamma`.
    pub fn new(model: M) -> Self {
        Self {
            model,
            config: AnnealConfig::default(),
            iter_count: 0,
            remaining: 0,
        }
    }

    /// Wraps `model` with parameter schedules.
    pub fn with_config(model: M, config: AnnealConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            model,
            config,
            iter_count: 0,
            remaining: 0,
        })
    }

    /// Total sweeps performed since construction.
    pub fn iter_count(&self) -> usize {
        self.iter_count
    }

    /// Sweeps left in the current [`anneal`](Self::anneal) call.
    pub fn remaining_iterations(&self) -> usize {
        self.remaining
    }

    pub fn config(&self) -> &AnnealConfig {
        &self.config
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    pub fn into_model(self) -> M {
        self.model
    }

    /// Runs exactly `max_iter` sweeps.
    pub fn anneal(&mut self, max_iter: usize) -> AnnealSummary {
        self.anneal_with_callback(max_iter, |_, _, _| {})
    }

    /// Runs exactly `max_iter` sweeps, calling
    /// `callback(annealer, state_was_updated, model_was_updated)` after each.
    ///
    /// `model_was_updated` reports whether a schedule changed `beta` or
    /// `gamma` after that sweep. The callback only observes.
    pub fn anneal_with_callback<F>(&mut self, max_iter: usize, mut callback: F) -> AnnealSummary
    where
        F: FnMut(&Self, bool, bool),
    {
        let initial_energy = self.model.energy();
        info!(
            event = "anneal_start",
            model = M::KIND,
            max_iter,
            beta = self.model.beta(),
            energy = initial_energy
        );

        let interval = self.config.history_interval;
        let mut objective_history = Vec::new();
        if interval > 0 {
            objective_history.push(self.model.objective_value());
        }

        self.remaining = max_iter;
        let mut accepted_sweeps = 0usize;
        for _ in 0..max_iter {
            let state_was_updated = self.model.update_state();
            if state_was_updated {
                accepted_sweeps += 1;
            }
            self.iter_count += 1;
            self.remaining -= 1;

            let model_was_updated = self.apply_schedules();

            if interval > 0 && self.iter_count.is_multiple_of(interval) {
                objective_history.push(self.model.objective_value());
            }

            callback(self, state_was_updated, model_was_updated);
        }

        let final_energy = self.model.energy();
        let final_objective = self.model.objective_value();
        info!(
            event = "anneal_end",
            model = M::KIND,
            iterations = max_iter,
            accepted_sweeps,
            energy = final_energy,
            objective = final_objective
        );

        AnnealSummary {
            iterations: max_iter,
            accepted_sweeps,
            initial_energy,
            final_energy,
            final_objective,
            objective_history,
        }
    }

    /// Advances `beta` (and `gamma`, if the model has one) by their
    /// schedules. Returns whether either value changed.
    fn apply_schedules(&mut self) -> bool {
        let iteration = self.iter_count;
        let mut changed = false;

        if !self.config.beta_schedule.is_constant() {
            let beta = self.model.beta();
            let next = self
                .config
                .beta_schedule
                .next(beta, iteration)
                .max(f64::MIN_POSITIVE);
            self.model.set_beta(next);
            changed |= self.model.beta() != beta;
        }

        if !self.config.gamma_schedule.is_constant() {
            if let Some(gamma) = self.model.gamma() {
                let next = self.config.gamma_schedule.next(gamma, iteration).max(0.0);
                self.model.set_gamma(next);
                changed |= self.model.gamma() != Some(gamma);
            }
        }

        if changed {
            debug!(
                event = "schedule",
                iteration,
                beta = self.model.beta(),
                gamma = ?self.model.gamma()
            );
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anneal::Schedule;
    use crate::error::AnnealError;
    use crate::model::ModelConfig;
    use crate::state::{ClassicalState, StateType};

    fn chain(n: usize) -> Vec<Vec<f64>> {
        let mut j = vec![vec![0.0; n]; n];
        for i in 0..n - 1 {
            j[i][i + 1] = 1.0;
        }
        j
    }

    fn classical(beta: f64, seed: u64) -> ClassicalModel {
        let config = ModelConfig::default()
            .with_state_type(StateType::Ising)
            .with_state_shape(vec![5])
            .with_beta(beta)
            .with_seed(seed);
        ClassicalModel::new(chain(5), vec![3.0; 5], 0.0, &config).unwrap()
    }

    fn quantum(beta: f64, gamma: f64, seed: u64) -> QuantumModel {
        let config = ModelConfig::default()
            .with_state_type(StateType::Ising)
            .with_state_shape(vec![5])
            .with_n_trotter(4)
            .with_beta(beta)
            .with_gamma(gamma)
            .with_seed(seed);
        QuantumModel::new(chain(5), vec![3.0; 5], 0.0, &config).unwrap()
    }

    #[test]
    fn test_iteration_count_and_callback() {
        let mut annealer = SimulatedAnnealer::new(classical(1.0, 1));
        let mut calls = Vec::new();
        let summary = annealer.anneal_with_callback(7, |a, _, model_was_updated| {
            calls.push((a.iter_count(), a.remaining_iterations(), model_was_updated));
        });
        assert_eq!(summary.iterations, 7);
        assert_eq!(annealer.iter_count(), 7);
        assert_eq!(annealer.remaining_iterations(), 0);
        assert_eq!(calls.len(), 7);
        for (k, &(count, remaining, updated)) in calls.iter().enumerate() {
            assert_eq!(count, k + 1);
            assert_eq!(remaining, 6 - k);
            assert!(!updated);
        }

        annealer.anneal(3);
        assert_eq!(annealer.iter_count(), 10);
    }

    #[test]
    fn test_zero_iterations() {
        let mut annealer = SimulatedAnnealer::new(classical(1.0, 2));
        let before = annealer.model().state().clone();
        let summary = annealer.anneal(0);
        assert_eq!(summary.iterations, 0);
        assert_eq!(summary.accepted_sweeps, 0);
        assert_eq!(summary.initial_energy, summary.final_energy);
        assert_eq!(annealer.model().state(), &before);
    }

    #[test]
    fn test_greedy_reaches_ground_state() {
        // All spins up: -(n - 1) from the chain, -3n from the field.
        let mut annealer = SimulatedAnnealer::new(classical(f64::INFINITY, 3));
        let summary = annealer.anneal(5);
        assert_eq!(summary.final_energy, -19.0);
        assert_eq!(summary.final_objective, -19.0);
        assert!(summary.accepted_sweeps <= 1);

        let model = annealer.into_model();
        let expected = ClassicalState::from_values(vec![5], StateType::Ising, vec![1; 5]).unwrap();
        assert_eq!(model.state(), &expected);
    }

    #[test]
    fn test_quantum_annealer_finds_ground_state() {
        let mut annealer = QuantumAnnealer::new(quantum(1000.0, 1.0, 4));
        annealer.anneal(5);
        let model = annealer.model();
        let best = model.observe_best();
        assert_eq!(model.tensor().energy(&best).unwrap(), -19.0);
        assert_eq!(model.objective_value(), -19.0);
    }

    #[test]
    fn test_beta_schedule_applied() {
        let config = AnnealConfig::default().with_beta_schedule(Schedule::Geometric { factor: 2.0 });
        let mut annealer = SimulatedAnnealer::with_config(classical(1.0, 5), config).unwrap();
        let mut updates = 0;
        annealer.anneal_with_callback(3, |_, _, model_was_updated| {
            if model_was_updated {
                updates += 1;
            }
        });
        assert_eq!(updates, 3);
        assert_eq!(annealer.model().beta(), 8.0);
    }

    #[test]
    fn test_gamma_schedule_clamped_at_zero() {
        let config = AnnealConfig::default().with_gamma_schedule(Schedule::Linear { step: -0.4 });
        let mut annealer = QuantumAnnealer::with_config(quantum(2.0, 1.0, 6), config).unwrap();
        let mut flags = Vec::new();
        annealer.anneal_with_callback(4, |_, _, model_was_updated| flags.push(model_was_updated));
        assert_eq!(annealer.model().gamma(), Some(0.0));
        // 1.0 -> 0.6 -> 0.2 -> 0.0 -> 0.0
        assert_eq!(flags, vec![true, true, true, false]);
        assert!(annealer.model().energy().is_finite());
    }

    #[test]
    fn test_gamma_schedule_ignored_by_classical_model() {
        let config = AnnealConfig::default().with_gamma_schedule(Schedule::Geometric { factor: 0.5 });
        let mut annealer = SimulatedAnnealer::with_config(classical(1.0, 7), config).unwrap();
        annealer.anneal_with_callback(3, |_, _, model_was_updated| assert!(!model_was_updated));
        assert_eq!(annealer.model().gamma(), None);
    }

    #[test]
    fn test_custom_schedule_sees_iteration() {
        fn ramp(_: f64, iteration: usize) -> f64 {
            iteration as f64
        }
        let config = AnnealConfig::default().with_beta_schedule(Schedule::Custom(ramp));
        let mut annealer = SimulatedAnnealer::with_config(classical(0.5, 8), config).unwrap();
        annealer.anneal(4);
        assert_eq!(annealer.model().beta(), 4.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AnnealConfig::default().with_beta_schedule(Schedule::Geometric { factor: 0.0 });
        assert!(matches!(
            SimulatedAnnealer::with_config(classical(1.0, 9), config),
            Err(AnnealError::Config(_))
        ));
        assert!(SimulatedAnnealer::with_config(classical(1.0, 9), AnnealConfig::default()).is_ok());
    }

    #[test]
    fn test_objective_history() {
        let config = AnnealConfig::default().with_history_interval(3);
        let mut annealer = QuantumAnnealer::with_config(quantum(5.0, 1.0, 10), config).unwrap();
        let summary = annealer.anneal(10);
        // Initial value plus samples after sweeps 3, 6 and 9.
        assert_eq!(summary.objective_history.len(), 4);

        let summary = SimulatedAnnealer::new(classical(1.0, 10)).anneal(10);
        assert!(summary.objective_history.is_empty());
    }

    #[test]
    fn test_same_seed_same_summary() {
        let a = SimulatedAnnealer::new(classical(0.7, 11)).anneal(20);
        let b = SimulatedAnnealer::new(classical(0.7, 11)).anneal(20);
        assert_eq!(a, b);
    }
}
