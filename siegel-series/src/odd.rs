//! Jordan blocks at an odd prime.
//!
//! Every unimodular constituent over Z_p (p odd) diagonalizes, and a unit is
//! determined up to squares by its Legendre symbol, so each diagonal entry
//! becomes `Unit(scale, 1)` or `Unit(scale, n)` with n the least nonresidue.

use crate::blocks::{Block, BlockList};
use crate::error::SiegelError;
use padic_core::{least_quadratic_nonresidue, legendre_symbol};
use quadratic_forms::{check_prime, decompose_by_scale, QuadraticForm};

/// Split `form` into canonical unit blocks at the odd prime `p`.
pub fn split_odd_prime(form: &QuadraticForm, p: u64) -> Result<BlockList, SiegelError> {
    if p == 2 {
        return Err(SiegelError::NotOddPrime(p));
    }
    check_prime(p)?;
    let nonresidue = least_quadratic_nonresidue(p).ok_or(SiegelError::NotOddPrime(p))?;

    let classes = decompose_by_scale(form, p)?;
    let mut blocks = Vec::with_capacity(form.dim());
    for class in &classes {
        for i in 0..class.rank() {
            let residue = if legendre_symbol(&class.unimodular[i][i], p) == 1 {
                1
            } else {
                nonresidue
            };
            blocks.push(Block::Unit {
                scale: class.scale,
                residue,
            });
        }
    }
    // Discovered ascending; blocks are kept by non-increasing scale.
    blocks.reverse();

    log::debug!(
        "p={}: {} unit blocks over {} scales",
        p,
        blocks.len(),
        classes.len()
    );
    Ok(BlockList::from_sorted(p, blocks))
}
