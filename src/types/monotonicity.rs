//! Monotonicity policy for feature value changes.

use crate::error::{FeatureError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Direction in which a feature value may legally change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Monotonicity {
    /// Any change is allowed.
    #[default]
    None,
    /// The value may only stay or increase.
    Increasing,
    /// The value may only stay or decrease.
    Decreasing,
}

impl Monotonicity {
    /// Returns true if a move from `pre` to `post` respects this policy,
    /// given that both lie on the same ordered scale.
    pub fn permits(self, pre: f64, post: f64) -> bool {
        match self {
            Monotonicity::None => true,
            Monotonicity::Increasing => post >= pre,
            Monotonicity::Decreasing => post <= pre,
        }
    }
}

impl std::fmt::Display for Monotonicity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Monotonicity::None => write!(f, "NONE"),
            Monotonicity::Increasing => write!(f, "INCREASING"),
            Monotonicity::Decreasing => write!(f, "DECREASING"),
        }
    }
}

impl std::str::FromStr for Monotonicity {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "NONE" | "" => Ok(Monotonicity::None),
            "INCREASING" | "+" => Ok(Monotonicity::Increasing),
            "DECREASING" | "-" => Ok(Monotonicity::Decreasing),
            _ => Err(FeatureError::InvalidParameter {
                name: "monotone",
                message: format!(
                    "Unknown monotonicity '{}'. Expected: NONE, INCREASING, DECREASING",
                    s
                ),
            }),
        }
    }
}
