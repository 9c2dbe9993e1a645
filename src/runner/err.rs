//! Evaluation errors.

use crate::budget::ConfigError;
use crate::models::InvariantViolation;

/// Why a single program evaluation was abandoned.
#[derive(Debug)]
pub enum EvaluationError {
    /// The budget for the instance could not be set up.
    Config(ConfigError),
    /// The route state became inconsistent.
    Invariant(InvariantViolation),
}

impl std::fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvaluationError::Config(e) => write!(f, "budget configuration: {e}"),
            EvaluationError::Invariant(e) => write!(f, "invariant violated: {e}"),
        }
    }
}

impl std::error::Error for EvaluationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EvaluationError::Config(e) => Some(e),
            EvaluationError::Invariant(e) => Some(e),
        }
    }
}

impl From<ConfigError> for EvaluationError {
    fn from(e: ConfigError) -> Self {
        EvaluationError::Config(e)
    }
}

impl From<InvariantViolation> for EvaluationError {
    fn from(e: InvariantViolation) -> Self {
        EvaluationError::Invariant(e)
    }
}
