//! Preparation of Katsurada's 2-adic recursion for the local Siegel series.
//!
//! The recursion (Katsurada, "An explicit formula for Siegel series", Thms
//! 4.1 and 4.2) peels the leading Jordan constituent off a 2-adic block list
//! and needs `max_scale >= i(B2) + 1` for every remaining tail B2.

use crate::blocks::BlockList;
use num_bigint::BigInt;
use num_traits::Zero;
use padic_core::valuation;
use quadratic_forms::{adjugate, QuadraticForm};

/// The recursion hypothesis failed or could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HypothesisViolation {
    #[error("the recursion runs on 2-adic block lists, got p = {0}")]
    NotTwoAdic(u64),

    #[error("max scale {max_scale} is below i(B2) + 1 = {bound} with {remaining} blocks left")]
    ScaleTooSmall {
        max_scale: i32,
        bound: i64,
        remaining: usize,
    },
}

/// Katsurada's invariant i(B) of a nondegenerate form.
///
/// With m = 2 B^-1 = 4 adj(M) / det(M), i is the least 2-adic valuation of an
/// entry of m. Returns `-i - 1` if every diagonal entry of 2^-i m is even and
/// `-i` otherwise. `None` for empty or degenerate forms.
pub fn i_invariant(form: &QuadraticForm) -> Option<i64> {
    if form.dim() == 0 {
        return None;
    }
    let det = form.determinant();
    let det_val = valuation(&det, 2)? as i64;

    let adj = adjugate(form.gram());
    let four = BigInt::from(4);
    let entry_val = |x: &BigInt| -> Option<i64> {
        if x.is_zero() {
            None
        } else {
            valuation(&(x * &four), 2).map(|v| v as i64 - det_val)
        }
    };

    let i = adj.iter().flatten().filter_map(entry_val).min()?;
    let diagonal_even = (0..adj.len()).all(|k| entry_val(&adj[k][k]).map_or(true, |v| v > i));
    Some(if diagonal_even { -i - 1 } else { -i })
}

/// The tail the recursion continues with after consuming the leading
/// constituent.
///
/// One block is dropped when the top scale carries exactly one unit or the
/// list starts with a plane, two otherwise.
pub fn peel_leading(blocks: &BlockList) -> BlockList {
    let Some(top) = blocks.max_scale() else {
        return blocks.clone();
    };
    let starts_with_pair = blocks.blocks().first().map_or(false, |b| !b.is_unit());
    if blocks.units_at(top) == 1 || starts_with_pair {
        blocks.tail(1)
    } else {
        blocks.tail(2)
    }
}

/// Check `max_scale >= i(B2) + 1` along the whole peeling sequence, for as
/// long as more than two blocks remain.
pub fn check_recursion_hypothesis(blocks: &BlockList) -> Result<(), HypothesisViolation> {
    if blocks.prime() != 2 {
        return Err(HypothesisViolation::NotTwoAdic(blocks.prime()));
    }
    let Some(max_scale) = blocks.max_scale() else {
        return Ok(());
    };

    let mut tail = peel_leading(blocks);
    while tail.len() > 2 {
        if let Some(i) = i_invariant(&tail.to_form()) {
            log::trace!("i(B2) = {} for {}", i, tail);
            if (max_scale as i64) < i + 1 {
                return Err(HypothesisViolation::ScaleTooSmall {
                    max_scale,
                    bound: i + 1,
                    remaining: tail.len(),
                });
            }
        }
        tail = peel_leading(&tail);
    }
    Ok(())
}
