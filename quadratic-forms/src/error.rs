//! Errors raised while building or decomposing quadratic forms.

/// The input does not describe an integral even quadratic form at a prime.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Gram matrix row {row} has {len} entries, expected {expected}")]
    NotSquare {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("Gram matrix is not symmetric at ({row}, {col})")]
    NotSymmetric { row: usize, col: usize },

    #[error("diagonal entry {index} is odd; the Gram matrix of an even form has even diagonal")]
    OddDiagonal { index: usize },

    #[error("{0} is not a prime")]
    NotPrime(u64),
}

/// The p-adic scale decomposition could not be completed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecompositionError {
    #[error("form is degenerate: only {rank} of {dim} dimensions split off before a zero block")]
    Degenerate { rank: usize, dim: usize },

    #[error("unimodular constituent at scale {scale} ends in a truncated 2x2 block")]
    TruncatedPlane { scale: i32 },
}
