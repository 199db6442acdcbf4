//! Error types for arena-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid LED mode code: {0}")]
    InvalidLedMode(i64),

    #[error("Invalid vault LED mode code: {0}")]
    InvalidVaultLedMode(i64),

    #[error("{kind} index {index} out of range (len {len})")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },

    #[error("{kind} length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid match phase: {0}")]
    InvalidPhase(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
