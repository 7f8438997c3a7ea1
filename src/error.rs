use crate::common::defs::State;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MdpError {
    /// Malformed grid, out-of-range discount factor or misplaced terminal.
    #[error("Invalid configuration: {reason}")]
    Configuration { reason: String },

    #[error("Invalid parameter {name} = {value}: must be finite and > 0")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("Policy has no action for non-terminal state {state:?}")]
    IncompletePolicy { state: State },

    /// A safety cap was hit, or values overflowed, before the fixed point was reached.
    #[error("{algorithm} did not converge within {iterations} iterations")]
    NonConvergence {
        algorithm: &'static str,
        iterations: usize,
    },
}

impl MdpError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MdpError>;

/// Rejects non-positive or non-finite tolerances.
pub fn check_tolerance(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0. {
        Ok(())
    } else {
        Err(MdpError::InvalidParameter { name, value })
    }
}
