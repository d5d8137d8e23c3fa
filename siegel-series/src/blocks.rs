//! Canonical Jordan blocks and their lift back to an integral form.
//!
//! Gram matrices of the blocks, with B read as a half-integral matrix:
//!
//! ```text
//! Unit(a, r)      p^a * [r]
//! Hyperbolic(a)   2^a * [[0, 1/2], [1/2, 0]]
//! OddPair(a)      2^a * [[1, 1/2], [1/2, 1]]
//! ```

use crate::error::SiegelError;
use num_bigint::BigInt;
use num_traits::{One, Pow};
use quadratic_forms::{hasse_invariant, DecompositionError, Matrix, QuadraticForm};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;

/// The two rank-2 even planes of a 2-adic splitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PairKind {
    Hyperbolic,
    OddPair,
}

/// A canonical Jordan block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    /// Rank 1. Odd p: residue is 1 or the least nonresidue. p = 2: residue in {1, 3, 5, 7}.
    Unit { scale: i32, residue: u64 },
    /// Rank 2, p = 2 only.
    Hyperbolic { scale: i32 },
    /// Rank 2, p = 2 only.
    OddPair { scale: i32 },
}

impl Block {
    pub fn pair(kind: PairKind, scale: i32) -> Self {
        match kind {
            PairKind::Hyperbolic => Block::Hyperbolic { scale },
            PairKind::OddPair => Block::OddPair { scale },
        }
    }

    pub fn scale(&self) -> i32 {
        match self {
            Block::Unit { scale, .. } | Block::Hyperbolic { scale } | Block::OddPair { scale } => {
                *scale
            }
        }
    }

    pub fn rank(&self) -> usize {
        match self {
            Block::Unit { .. } => 1,
            Block::Hyperbolic { .. } | Block::OddPair { .. } => 2,
        }
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, Block::Unit { .. })
    }

    /// Determinant of the block's integral Gram matrix 2 p^scale G.
    fn gram_det(&self, p: u64) -> BigInt {
        let ps = BigInt::from(p).pow(self.scale() as u32);
        match self {
            Block::Unit { residue, .. } => ps * 2 * BigInt::from(*residue),
            Block::Hyperbolic { .. } => -(&ps * &ps),
            Block::OddPair { .. } => &ps * &ps * 3,
        }
    }

    /// The integral Gram matrix 2 p^scale G. Scale must be nonnegative.
    fn gram_block(&self, p: u64) -> Matrix {
        let ps = BigInt::from(p).pow(self.scale() as u32);
        let zero = BigInt::from(0);
        match self {
            Block::Unit { residue, .. } => vec![vec![&ps * 2 * BigInt::from(*residue)]],
            Block::Hyperbolic { .. } => {
                vec![vec![zero.clone(), ps.clone()], vec![ps, zero]]
            }
            Block::OddPair { .. } => {
                let two_ps: BigInt = &ps * 2;
                vec![vec![two_ps.clone(), ps.clone()], vec![ps, two_ps]]
            }
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Block::Unit { scale, residue } => write!(f, "Unit({}, {})", scale, residue),
            Block::Hyperbolic { scale } => write!(f, "Hyperbolic({})", scale),
            Block::OddPair { scale } => write!(f, "OddPair({})", scale),
        }
    }
}

/// Jordan blocks of a form at a prime, sorted by non-increasing scale.
///
/// Deserialization goes through [`BlockList::from_blocks`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBlockList")]
pub struct BlockList {
    prime: u64,
    blocks: Vec<Block>,
}

#[derive(Deserialize)]
struct RawBlockList {
    prime: u64,
    blocks: Vec<Block>,
}

impl TryFrom<RawBlockList> for BlockList {
    type Error = SiegelError;

    fn try_from(raw: RawBlockList) -> Result<Self, Self::Error> {
        BlockList::from_blocks(raw.prime, raw.blocks)
    }
}

impl BlockList {
    /// Build a list from arbitrary blocks, sorting by non-increasing scale.
    ///
    /// Blocks sharing a scale keep their relative order.
    pub fn from_blocks(prime: u64, mut blocks: Vec<Block>) -> Result<Self, SiegelError> {
        check_liftable(&blocks, prime)?;
        blocks.sort_by_key(|b| Reverse(b.scale()));
        Ok(BlockList { prime, blocks })
    }

    /// Wrap blocks the splitters already produced in canonical order.
    pub(crate) fn from_sorted(prime: u64, blocks: Vec<Block>) -> Self {
        debug_assert!(blocks.windows(2).all(|w| w[0].scale() >= w[1].scale()));
        BlockList { prime, blocks }
    }

    pub fn prime(&self) -> u64 {
        self.prime
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    /// Total rank of the blocks.
    pub fn dim(&self) -> usize {
        self.blocks.iter().map(Block::rank).sum()
    }

    /// Scale of the leading block.
    pub fn max_scale(&self) -> Option<i32> {
        self.blocks.first().map(Block::scale)
    }

    /// p-adic valuation of the content of the lifted form: the smallest scale.
    pub fn content_order(&self) -> Option<i32> {
        self.blocks.last().map(Block::scale)
    }

    /// Number of rank-1 blocks at `scale`.
    pub fn units_at(&self, scale: i32) -> usize {
        self.blocks
            .iter()
            .filter(|b| b.is_unit() && b.scale() == scale)
            .count()
    }

    /// Largest number of rank-1 blocks sharing one scale.
    pub fn max_units_per_scale(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| b.is_unit())
            .map(|b| self.units_at(b.scale()))
            .max()
            .unwrap_or(0)
    }

    /// Determinant of the lifted Gram matrix M = 2B.
    pub fn gram_det(&self) -> BigInt {
        self.blocks
            .iter()
            .fold(BigInt::one(), |acc, b| acc * b.gram_det(self.prime))
    }

    /// Hasse invariant of the lifted form at this list's prime.
    pub fn hasse_invariant(&self) -> Result<i32, DecompositionError> {
        hasse_invariant(&self.to_form(), self.prime)
    }

    /// The orthogonal sum of the blocks as an integral form.
    pub fn to_form(&self) -> QuadraticForm {
        lift_unchecked(&self.blocks, self.prime)
    }

    /// The sublist starting at block `start`.
    pub fn tail(&self, start: usize) -> BlockList {
        BlockList {
            prime: self.prime,
            blocks: self.blocks[start.min(self.blocks.len())..].to_vec(),
        }
    }
}

impl<'a> IntoIterator for &'a BlockList {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

impl fmt::Display for BlockList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, b) in self.blocks.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", b)?;
        }
        write!(f, "]")
    }
}

/// Reconstruct an integral form from blocks: each block's Gram matrix is scaled
/// by 2 p^scale and the results are summed orthogonally.
pub fn lift_to_form(blocks: &[Block], p: u64) -> Result<QuadraticForm, SiegelError> {
    check_liftable(blocks, p)?;
    Ok(lift_unchecked(blocks, p))
}

/// Scales must be nonnegative and even planes only occur at p = 2.
fn check_liftable(blocks: &[Block], p: u64) -> Result<(), SiegelError> {
    for b in blocks {
        if b.scale() < 0 {
            return Err(SiegelError::NegativeScale(b.scale()));
        }
        if p != 2 && !b.is_unit() {
            return Err(SiegelError::PlaneAtOddPrime {
                prime: p,
                scale: b.scale(),
            });
        }
    }
    Ok(())
}

fn lift_unchecked(blocks: &[Block], p: u64) -> QuadraticForm {
    blocks.iter().fold(QuadraticForm::empty(), |acc, b| {
        let block = QuadraticForm::new(b.gram_block(p))
            .expect("block Gram matrices are symmetric with even diagonal");
        acc.direct_sum(&block)
    })
}
