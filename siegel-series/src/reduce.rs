//! Collapse same-scale 2-adic unit diagonals to at most two entries.
//!
//! Three odd units u1, u2, u3 at one scale are traded for one unit and one
//! even plane at the next scale:
//!
//! ```text
//! u1 x^2 + u2 y^2 + u3 z^2 ~ (-u) w^2 ⊕ H     if the triple is isotropic
//!                          ~ (3u) w^2 ⊕ Y     otherwise,   u = u1 u2 u3
//! ```
//!
//! e.g. x1^2 + x2^2 + x3^2 ~ 3 x1^2 + 2 (x2^2 + x2 x3 + x3^2).

use crate::blocks::PairKind;
use crate::oracle::represents_zero_2adically;

/// One entry of a reduced unit diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduced {
    /// An odd unit residue mod 8 at the input scale.
    Residue(u8),
    /// A rank-2 even plane, one scale above the input units.
    Pair(PairKind),
}

impl Reduced {
    pub fn rank(&self) -> usize {
        match self {
            Reduced::Residue(_) => 1,
            Reduced::Pair(_) => 2,
        }
    }
}

/// Reduce a diagonal of odd unit residues to at most two residues plus planes.
///
/// Rank is preserved: `#residues + 2 * #planes == units.len()`. Lists of two or
/// fewer units come back unchanged.
pub fn reduce_units(units: &[u8]) -> Vec<Reduced> {
    if units.len() <= 2 {
        return units.iter().map(|&u| Reduced::Residue(u)).collect();
    }

    let (u1, u2, u3) = (units[0], units[1], units[2]);
    let u = (u1 as u32 * u2 as u32 * u3 as u32) % 8;

    let mut reduced = reduce_units(&units[3..]);
    if represents_zero_2adically(u1, u2, u3) {
        reduced.push(Reduced::Residue(((8 - u) % 8) as u8));
        reduced.push(Reduced::Pair(PairKind::Hyperbolic));
    } else {
        reduced.push(Reduced::Residue((3 * u % 8) as u8));
        reduced.push(Reduced::Pair(PairKind::OddPair));
    }

    let residues: Vec<u8> = reduced
        .iter()
        .filter_map(|r| match r {
            Reduced::Residue(u) => Some(*u),
            Reduced::Pair(_) => None,
        })
        .collect();
    if residues.len() <= 2 {
        return reduced;
    }

    // The new unit pushed the diagonal past two again.
    let mut out = reduce_units(&residues);
    out.extend(reduced.into_iter().filter(|r| matches!(r, Reduced::Pair(_))));
    out
}
