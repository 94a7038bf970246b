//! Strategies deciding which basis terms a chaos expansion may use.

use crate::errors::{ChaosError, Result};

/// How the candidate basis evolves during the fit.
#[derive(Clone, Debug, PartialEq)]
pub enum AdaptiveStrategy {
    /// Use a fixed number of terms, `0` meaning the full basis of the
    /// requested total degree
    Fixed {
        /// Number of candidate terms
        basis_size: usize,
    },
    /// Build over a larger candidate set, then discard the terms whose
    /// coefficient is negligible against the largest one
    Cleaning {
        /// Number of candidate terms considered
        candidate_size: usize,
        /// Largest number of terms kept in the final basis
        max_retained: usize,
        /// Relative coefficient magnitude below which a term is discarded
        significance: f64,
    },
    /// Grow the basis stratum by stratum until the residual is small enough
    /// or the basis reaches its maximum size
    Sequential {
        /// Number of terms of the first candidate basis
        initial_size: usize,
        /// Largest candidate basis considered
        maximum_size: usize,
        /// Root mean square residual below which growth stops
        residual_tolerance: f64,
    },
}

impl Default for AdaptiveStrategy {
    fn default() -> Self {
        AdaptiveStrategy::Fixed { basis_size: 0 }
    }
}

impl AdaptiveStrategy {
    /// Check the strategy parameters
    pub fn validate(&self) -> Result<()> {
        match *self {
            AdaptiveStrategy::Fixed { .. } => Ok(()),
            AdaptiveStrategy::Cleaning {
                candidate_size,
                max_retained,
                significance,
            } => {
                if max_retained == 0 || candidate_size < max_retained {
                    return Err(ChaosError::InvalidArgumentError(format!(
                        "cleaning needs 1 <= max_retained <= candidate_size, \
                         got {max_retained} and {candidate_size}"
                    )));
                }
                if !(significance > 0. && significance < 1.) {
                    return Err(ChaosError::InvalidArgumentError(format!(
                        "cleaning significance must lie in (0, 1), got {significance}"
                    )));
                }
                Ok(())
            }
            AdaptiveStrategy::Sequential {
                initial_size,
                maximum_size,
                residual_tolerance,
            } => {
                if initial_size == 0 || maximum_size < initial_size {
                    return Err(ChaosError::InvalidArgumentError(format!(
                        "sequential needs 1 <= initial_size <= maximum_size, \
                         got {initial_size} and {maximum_size}"
                    )));
                }
                if residual_tolerance < 0. {
                    return Err(ChaosError::InvalidArgumentError(format!(
                        "sequential residual tolerance must be non-negative, \
                         got {residual_tolerance}"
                    )));
                }
                Ok(())
            }
        }
    }
}

/// One candidate basis examined during the fit of a single output.
#[derive(Clone, Debug)]
pub struct SelectionStep {
    /// Number of candidate terms offered to the selection
    pub candidate_terms: usize,
    /// Terms retained at this step, as indices into the enumeration
    pub retained_terms: Vec<usize>,
    /// Fitness score of the retained basis, the lower the better
    pub score: f64,
}

/// Trace of the candidate bases examined while fitting one output.
#[derive(Clone, Debug, Default)]
pub struct SelectionHistory {
    steps: Vec<SelectionStep>,
}

impl SelectionHistory {
    /// Record one examined candidate basis
    pub fn push(&mut self, step: SelectionStep) {
        self.steps.push(step);
    }

    /// The recorded steps, in examination order
    pub fn steps(&self) -> &[SelectionStep] {
        &self.steps
    }

    /// The best recorded step, breaking score ties towards the earliest one
    pub fn best(&self) -> Option<&SelectionStep> {
        self.steps
            .iter()
            .reduce(|best, step| if step.score < best.score { step } else { best })
    }
}
