//! Spin models and their Metropolis sweeps.
//!
//! - [`ClassicalModel`]: one replica, simulated annealing.
//! - [`QuantumModel`]: `n_trotter` replicas coupled along the Trotter
//!   axis by an effective ferromagnetic term derived from the transverse
//!   field (path-integral Monte Carlo).
//!
//! Both evaluate acceptance from the exact energy change of a single
//! flip and only write the flip once it is accepted, so a rejected move
//! never leaves the state modified.
//!
//! # References
//!
//! - Metropolis et al. (1953), "Equation of State Calculations by Fast
//!   Computing Machines"
//! - Martonak, Santoro & Tosatti (2002), "Quantum annealing by the
//!   path-integral Monte Carlo method: The two-dimensional random Ising model"

mod classical;
mod config;
mod quantum;
mod types;

pub use classical::ClassicalModel;
pub use config::ModelConfig;
pub use quantum::QuantumModel;
pub use types::SpinModel;

use crate::error::{AnnealError, Result};
use rand::Rng;
use u_numflow::random::create_rng;

/// Random source owned by every model, as produced by
/// [`u_numflow::random::create_rng`].
pub type AnnealRng = rand::rngs::SmallRng;

/// Seeded source, or a randomly seeded one when `seed` is `None`.
pub(crate) fn seeded_rng(seed: Option<u64>) -> AnnealRng {
    match seed {
        Some(seed) => create_rng(seed),
        None => create_rng(rand::random()),
    }
}

/// Metropolis criterion: always accept `delta <= 0`, otherwise accept
/// with probability `exp(-beta * delta)`.
#[inline]
pub(crate) fn metropolis_accept<R: Rng>(delta: f64, beta: f64, rng: &mut R) -> bool {
    if delta <= 0.0 {
        return true;
    }
    rng.random::<f64>() < (-beta * delta).exp()
}

/// Checks an explicit state's shape against a configured `state_shape`.
pub(crate) fn check_state_shape(configured: Option<&[usize]>, actual: &[usize]) -> Result<()> {
    match configured {
        Some(expected) if expected != actual => Err(AnnealError::ShapeMismatch {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metropolis_downhill_always_accepted() {
        let mut rng = seeded_rng(Some(1));
        for _ in 0..100 {
            assert!(metropolis_accept(-1.0, 1.0, &mut rng));
            assert!(metropolis_accept(0.0, f64::INFINITY, &mut rng));
        }
    }

    #[test]
    fn test_metropolis_infinite_beta_rejects_uphill() {
        let mut rng = seeded_rng(Some(2));
        for _ in 0..100 {
            assert!(!metropolis_accept(1e-9, f64::INFINITY, &mut rng));
        }
    }

    #[test]
    fn test_metropolis_acceptance_rate() {
        // exp(-1) ~ 0.368
        let mut rng = seeded_rng(Some(3));
        let accepted = (0..20_000)
            .filter(|_| metropolis_accept(1.0, 1.0, &mut rng))
            .count();
        let rate = accepted as f64 / 20_000.0;
        assert!((rate - (-1.0f64).exp()).abs() < 0.02, "rate {rate}");
    }

    #[test]
    fn test_check_state_shape() {
        assert!(check_state_shape(None, &[2, 2]).is_ok());
        assert!(check_state_shape(Some(&[2, 2]), &[2, 2]).is_ok());
        assert!(matches!(
            check_state_shape(Some(&[4]), &[2, 2]),
            Err(AnnealError::ShapeMismatch { .. })
        ));
    }
}
