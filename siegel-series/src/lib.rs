//! # siegel-series
//!
//! Canonical p-adic Jordan blocks of integral even quadratic forms, the local
//! input to Katsurada's recursive formula for the Siegel series.
//!
//! A form Q(x) = x^T B x is given by its Gram matrix M = 2B. Its Jordan
//! splitting at p is normalized into a [`BlockList`] of unit blocks and, at
//! p = 2, the even planes `Hyperbolic` and `OddPair`, ordered by
//! non-increasing scale.
//!
//! ## Algorithms
//!
//! - **Odd primes**: Legendre-symbol classification of the diagonalized units
//! - **p = 2**: plane detection plus collapse of three or more units at one
//!   scale, driven by a tabulated 2-adic zero-representation test
//! - **Lifting**: reconstruction of an integral form from a block list
//! - **Katsurada preparation**: i(B) and the peeling sequence of the recursion

pub mod batch;
pub mod blocks;
pub mod error;
pub mod katsurada;
pub mod odd;
pub mod oracle;
pub mod reduce;
pub mod two_adic;

pub use batch::{run_survey, split_batch, PrimeSummary, SurveyConfig, SurveyReport};
pub use blocks::{lift_to_form, Block, BlockList, PairKind};
pub use error::SiegelError;
pub use katsurada::{check_recursion_hypothesis, i_invariant, peel_leading, HypothesisViolation};
pub use odd::split_odd_prime;
pub use oracle::represents_zero_2adically;
pub use reduce::{reduce_units, Reduced};
pub use two_adic::split_two_adic;

use quadratic_forms::{check_prime, QuadraticForm};

/// Canonical Jordan blocks of `form` at any prime `p`.
pub fn jordan_blocks(form: &QuadraticForm, p: u64) -> Result<BlockList, SiegelError> {
    check_prime(p)?;
    if p == 2 {
        split_two_adic(form)
    } else {
        split_odd_prime(form, p)
    }
}

/// Canonical Jordan blocks of the form with Gram matrix rows `rows` (M = 2B).
pub fn jordan_blocks_from_rows(rows: &[Vec<i64>], p: u64) -> Result<BlockList, SiegelError> {
    let form = QuadraticForm::from_rows(rows)?;
    jordan_blocks(&form, p)
}
