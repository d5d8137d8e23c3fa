//! Jordan blocks at p = 2.
//!
//! A 2-adic unimodular constituent at scale a is an orthogonal sum of odd
//! units and the even planes H, Y. Units are read off mod 8, planes move to
//! scale a + 1 (their entries are half-integral at scale a), and any scale
//! carrying three or more units is collapsed with [`reduce_units`].

use crate::blocks::{Block, BlockList};
use crate::error::SiegelError;
use crate::reduce::{reduce_units, Reduced};
use num_traits::Zero;
use padic_core::residue;
use quadratic_forms::{decompose_by_scale, DecompositionError, QuadraticForm, ScaleClass};
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Split `form` into canonical 2-adic blocks.
///
/// The result has at most two `Unit` blocks per scale and is sorted by
/// non-increasing scale.
pub fn split_two_adic(form: &QuadraticForm) -> Result<BlockList, SiegelError> {
    let classes = decompose_by_scale(form, 2)?;

    let mut pairs = Vec::new();
    let mut units: BTreeMap<i32, Vec<u8>> = BTreeMap::new();
    for class in &classes {
        read_constituent(class, &mut pairs, &mut units)?;
    }

    let mut blocks = pairs;
    for (&scale, residues) in &units {
        if residues.len() > 2 {
            log::trace!("reducing {} units at scale {}", residues.len(), scale);
        }
        for r in reduce_units(residues) {
            blocks.push(match r {
                Reduced::Residue(u) => Block::Unit {
                    scale,
                    residue: u as u64,
                },
                Reduced::Pair(kind) => Block::pair(kind, scale + 1),
            });
        }
    }
    blocks.sort_by_key(|b| Reverse(b.scale()));

    log::debug!(
        "p=2: {} blocks from {} scale classes of a {}-dimensional form",
        blocks.len(),
        classes.len(),
        form.dim()
    );
    Ok(BlockList::from_sorted(2, blocks))
}

/// Walk one unimodular constituent, pushing planes to `pairs` and unit
/// residues mod 8 to their scale's bucket.
fn read_constituent(
    class: &ScaleClass,
    pairs: &mut Vec<Block>,
    units: &mut BTreeMap<i32, Vec<u8>>,
) -> Result<(), DecompositionError> {
    let m = &class.unimodular;
    let n = m.len();
    let a = class.scale;
    let mut i = 0;
    while i < n {
        let corner = &m[i][i];
        if residue(corner, 2) == 1 {
            units.entry(a).or_default().push(residue(corner, 8) as u8);
            i += 1;
            continue;
        }
        if i + 1 >= n {
            return Err(DecompositionError::TruncatedPlane { scale: a });
        }
        pairs.push(if corner.is_zero() {
            Block::Hyperbolic { scale: a + 1 }
        } else {
            Block::OddPair { scale: a + 1 }
        });
        i += 2;
    }
    Ok(())
}
