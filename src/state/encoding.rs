//! Binary encodings of a spin variable.

use crate::error::{AnnealError, Result};
use rand::Rng;
use std::fmt;
use std::str::FromStr;

/// Encoding of every variable in a state.
///
/// The two variants form a closed set; every encoding-specific rule
/// (random draw, flip, domain check, bipolar mapping) dispatches on this
/// tag so the state buffers themselves stay encoding-agnostic.
///
/// # Examples
///
/// ```
/// use u_anneal::state::StateType;
///
/// let ising: StateType = "ising".parse().unwrap();
/// assert_eq!(ising.flip(1), -1);
/// assert_eq!(StateType::Qubo.flip(0), 1);
/// assert!("spin".parse::<StateType>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum StateType {
    /// Variables take values in `{0, 1}`.
    #[default]
    Qubo,
    /// Variables take values in `{-1, +1}`.
    Ising,
}

impl StateType {
    /// Draws one uniformly random value in this encoding.
    ///
    /// Both encodings draw a bit in `{0, 1}`; Ising maps it to `2b - 1`.
    pub fn draw<R: Rng>(self, rng: &mut R) -> i8 {
        let bit: i8 = rng.random_range(0..2);
        match self {
            StateType::Qubo => bit,
            StateType::Ising => 2 * bit - 1,
        }
    }

    /// Flips a value: `x -> 1 - x` for QUBO, `x -> -x` for Ising.
    #[inline]
    pub fn flip(self, value: i8) -> i8 {
        match self {
            StateType::Qubo => 1 - value,
            StateType::Ising => -value,
        }
    }

    /// Maps a value to its bipolar (`{-1, +1}`) form.
    #[inline]
    pub fn bipolar(self, value: i8) -> i8 {
        match self {
            StateType::Qubo => 2 * value - 1,
            StateType::Ising => value,
        }
    }

    /// Whether `value` belongs to this encoding's domain.
    pub fn contains(self, value: i8) -> bool {
        match self {
            StateType::Qubo => value == 0 || value == 1,
            StateType::Ising => value == -1 || value == 1,
        }
    }

    /// Converts a value of this encoding into `target`'s encoding.
    #[inline]
    pub fn convert(self, value: i8, target: StateType) -> i8 {
        match (self, target) {
            (StateType::Qubo, StateType::Ising) => 2 * value - 1,
            (StateType::Ising, StateType::Qubo) => (value + 1) / 2,
            _ => value,
        }
    }

    /// Checks that every value lies in the domain.
    pub(crate) fn check_values(self, values: &[i8]) -> Result<()> {
        match values.iter().position(|&v| !self.contains(v)) {
            Some(pos) => Err(AnnealError::InvalidArgument(format!(
                "value {} at offset {pos} is not a valid {self} value",
                values[pos]
            ))),
            None => Ok(()),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StateType::Qubo => "qubo",
            StateType::Ising => "ising",
        }
    }
}

impl fmt::Display for StateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StateType {
    type Err = AnnealError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "qubo" => Ok(StateType::Qubo),
            "ising" => Ok(StateType::Ising),
            _ => Err(AnnealError::UnknownStateType(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use u_numflow::random::create_rng;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("QUBO".parse::<StateType>().unwrap(), StateType::Qubo);
        assert_eq!("Ising".parse::<StateType>().unwrap(), StateType::Ising);
    }

    #[test]
    fn test_parse_unknown_names_value() {
        let err = "potts".parse::<StateType>().unwrap_err();
        assert_eq!(err, AnnealError::UnknownStateType("potts".into()));
    }

    #[test]
    fn test_flip_is_involution() {
        for enc in [StateType::Qubo, StateType::Ising] {
            for v in [-1i8, 0, 1] {
                if enc.contains(v) {
                    assert_eq!(enc.flip(enc.flip(v)), v);
                    assert!(enc.contains(enc.flip(v)));
                }
            }
        }
    }

    #[test]
    fn test_draw_stays_in_domain() {
        let mut rng = create_rng(42);
        for enc in [StateType::Qubo, StateType::Ising] {
            let draws: Vec<i8> = (0..200).map(|_| enc.draw(&mut rng)).collect();
            assert!(draws.iter().all(|&v| enc.contains(v)));
            // Both values should show up in 200 fair draws.
            assert!(draws.iter().any(|&v| v == 1));
            assert!(draws.iter().any(|&v| v != 1));
        }
    }

    #[test]
    fn test_convert_matches_bipolar() {
        assert_eq!(StateType::Qubo.convert(0, StateType::Ising), -1);
        assert_eq!(StateType::Qubo.convert(1, StateType::Ising), 1);
        assert_eq!(StateType::Ising.convert(-1, StateType::Qubo), 0);
        assert_eq!(StateType::Ising.convert(1, StateType::Qubo), 1);
        assert_eq!(StateType::Qubo.bipolar(0), -1);
    }

    #[test]
    fn test_check_values() {
        assert!(StateType::Qubo.check_values(&[0, 1, 1]).is_ok());
        assert!(StateType::Qubo.check_values(&[0, -1]).is_err());
        assert!(StateType::Ising.check_values(&[0]).is_err());
    }
}
