//! Field error types.

use arena_core::MatchPhase;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("Arena must be in pre-match state (currently {phase})")]
    PhaseViolation { phase: MatchPhase },
}

pub type FieldResult<T> = Result<T, FieldError>;
