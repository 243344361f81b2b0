//! Annealer configuration and parameter schedules.

use crate::error::{AnnealError, Result};

/// How a model parameter (`beta` or `gamma`) evolves between sweeps.
///
/// The annealer applies the schedule after every sweep, passing the
/// current value and the number of sweeps completed so far. Results are
/// clamped to the parameter's domain (`beta > 0`, `gamma >= 0`).
#[derive(Debug, Clone, Copy, Default)]
pub enum Schedule {
    /// Keep the value fixed.
    #[default]
    Constant,

    /// `v <- v * factor`.
    ///
    /// For `beta` a factor above 1 cools; for `gamma` a factor below 1
    /// weakens the transverse field.
    Geometric {
        /// Multiplier, finite and positive.
        factor: f64,
    },

    /// `v <- v + step`.
    Linear {
        /// Increment per sweep; may be negative.
        step: f64,
    },

    /// Caller-supplied `(current, completed_sweeps) -> next`.
    Custom(fn(f64, usize) -> f64),
}

impl Schedule {
    /// Next value of the parameter. Unclamped.
    pub fn next(&self, value: f64, iteration: usize) -> f64 {
        match *self {
            Schedule::Constant => value,
            Schedule::Geometric { factor } => value * factor,
            Schedule::Linear { step } => value + step,
            Schedule::Custom(f) => f(value, iteration),
        }
    }

    /// Whether the schedule can never change a value.
    pub fn is_constant(&self) -> bool {
        matches!(self, Schedule::Constant)
    }

    fn validate(&self, name: &str) -> Result<()> {
        match *self {
            Schedule::Geometric { factor } if !factor.is_finite() || factor <= 0.0 => {
                Err(AnnealError::Config(format!(
                    "{name} geometric factor must be finite and positive, got {factor}"
                )))
            }
            Schedule::Linear { step } if !step.is_finite() => Err(AnnealError::Config(format!(
                "{name} linear step must be finite, got {step}"
            ))),
            _ => Ok(()),
        }
    }
}

/// Configuration for an [`Annealer`](super::Annealer).
///
/// # Examples
///
/// ```
/// use u_anneal::anneal::{AnnealConfig, Schedule};
///
/// let config = AnnealConfig::default()
///     .with_beta_schedule(Schedule::Geometric { factor: 1.05 })
///     .with_gamma_schedule(Schedule::Geometric { factor: 0.95 })
///     .with_history_interval(10);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AnnealConfig {
    /// Schedule for the inverse temperature.
    pub beta_schedule: Schedule,

    /// Schedule for the transverse field. Ignored by models without one.
    pub gamma_schedule: Schedule,

    /// Record the objective every `history_interval` sweeps. 0 disables.
    pub history_interval: usize,
}

impl Default for AnnealConfig {
    fn default() -> Self {
        Self {
            beta_schedule: Schedule::Constant,
            gamma_schedule: Schedule::Constant,
            history_interval: 0,
        }
    }
}

impl AnnealConfig {
    pub fn with_beta_schedule(mut self, schedule: Schedule) -> Self {
        self.beta_schedule = schedule;
        self
    }

    pub fn with_gamma_schedule(mut self, schedule: Schedule) -> Self {
        self.gamma_schedule = schedule;
        self
    }

    pub fn with_history_interval(mut self, interval: usize) -> Self {
        self.history_interval = interval;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        self.beta_schedule.validate("beta")?;
        self.gamma_schedule.validate("gamma")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_constant() {
        let config = AnnealConfig::default();
        assert!(config.beta_schedule.is_constant());
        assert!(config.gamma_schedule.is_constant());
        assert_eq!(config.history_interval, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_schedule_next() {
        assert_eq!(Schedule::Constant.next(3.0, 7), 3.0);
        assert_eq!(Schedule::Geometric { factor: 2.0 }.next(3.0, 0), 6.0);
        assert_eq!(Schedule::Linear { step: -0.5 }.next(3.0, 0), 2.5);

        fn ramp(_: f64, iteration: usize) -> f64 {
            iteration as f64 * 10.0
        }
        assert_eq!(Schedule::Custom(ramp).next(3.0, 4), 40.0);
    }

    #[test]
    fn test_validate_bad_factor() {
        for factor in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = AnnealConfig::default().with_beta_schedule(Schedule::Geometric { factor });
            assert!(matches!(config.validate(), Err(AnnealError::Config(_))));
        }
    }

    #[test]
    fn test_validate_bad_step() {
        let config = AnnealConfig::default().with_gamma_schedule(Schedule::Linear { step: f64::NAN });
        assert!(matches!(config.validate(), Err(AnnealError::Config(_))));
    }
}
