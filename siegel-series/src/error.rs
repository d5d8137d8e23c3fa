//! Errors surfaced by the splitters.

use quadratic_forms::{DecompositionError, FormError};

/// Failure of a Jordan splitting. Never reinterpreted as an empty result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SiegelError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] FormError),

    #[error("invalid input: p = {0} is not an odd prime")]
    NotOddPrime(u64),

    #[error("invalid input: block at scale {0} cannot be lifted to an integral form")]
    NegativeScale(i32),

    #[error("invalid input: even plane at scale {scale} occurs only at p = 2, got p = {prime}")]
    PlaneAtOddPrime { prime: u64, scale: i32 },

    #[error("decomposition failed: {0}")]
    DecompositionFailure(#[from] DecompositionError),
}
