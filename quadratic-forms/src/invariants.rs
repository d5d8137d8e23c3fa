//! Local invariants used to compare forms over Z_p and Q_p.
//!
//! - Q_p-diagonalization read off the Jordan pieces
//! - Hasse invariant (O'Meara convention: product over i <= j)
//! - Per-scale Jordan data: scale, rank and type of each constituent

use crate::error::{DecompositionError, FormError};
use crate::form::QuadraticForm;
use crate::jordan::{decompose_by_scale, padic_pieces, Piece};
use num_bigint::BigInt;
use num_traits::{One, Pow, Zero};
use padic_core::{
    hilbert_symbol, is_prime, legendre_symbol, residue, same_square_class, valuation,
};

/// Check that `p` is a prime.
pub fn check_prime(p: u64) -> Result<(), FormError> {
    if is_prime(p) {
        Ok(())
    } else {
        Err(FormError::NotPrime(p))
    }
}

/// Diagonal entries of a Q_p-diagonalization of the Gram matrix M.
///
/// Even planes are replaced by rationally equivalent diagonal pairs:
/// 2^v H ~ diag(2^(v+1), -2^(v+1)) and 2^v Y ~ diag(2^(v+1), 6 * 2^v).
pub fn rational_diagonal(form: &QuadraticForm, p: u64) -> Result<Vec<BigInt>, DecompositionError> {
    let pieces = padic_pieces(form.gram(), p)?;
    let mut diagonal = Vec::with_capacity(form.dim());
    for piece in pieces {
        match piece {
            Piece::Unit { valuation, unit } => {
                diagonal.push(BigInt::from(p).pow(valuation) * unit);
            }
            Piece::Hyperbolic { valuation } => {
                let t = BigInt::from(2u32).pow(valuation + 1);
                diagonal.push(-t.clone());
                diagonal.push(t);
            }
            Piece::Anisotropic { valuation } => {
                let t = BigInt::from(2u32).pow(valuation);
                diagonal.push(&t * 2);
                diagonal.push(t * 6);
            }
        }
    }
    Ok(diagonal)
}

/// Hasse invariant of M over Q_p: the product of (a_i, a_j)_p over i <= j.
pub fn hasse_invariant(form: &QuadraticForm, p: u64) -> Result<i32, DecompositionError> {
    let diagonal = rational_diagonal(form, p)?;
    let mut s = 1i32;
    for i in 0..diagonal.len() {
        for j in i..diagonal.len() {
            s *= hilbert_symbol(&diagonal[i], &diagonal[j], p);
        }
    }
    Ok(s)
}

/// p-adic valuation of the content. `None` for the zero form.
pub fn content_valuation(form: &QuadraticForm, p: u64) -> Option<u32> {
    valuation(&form.content(), p)
}

/// Type of a Jordan constituent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstituentType {
    /// Odd p: Legendre symbol of the constituent's unit determinant.
    Residue(i32),
    /// p = 2: the constituent represents an odd unit times its scale.
    Odd,
    /// p = 2: the constituent is a sum of even planes.
    Even,
}

/// Scale, rank and type of one Jordan constituent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JordanConstituent {
    pub scale: i32,
    pub rank: usize,
    pub kind: ConstituentType,
}

/// Per-scale Jordan data, ascending by scale.
///
/// At odd p this classifies the form up to Z_p-isometry. At p = 2 scale, rank
/// and type are invariants but do not classify on their own.
pub fn jordan_invariants(
    form: &QuadraticForm,
    p: u64,
) -> Result<Vec<JordanConstituent>, DecompositionError> {
    let classes = decompose_by_scale(form, p)?;
    Ok(classes
        .iter()
        .map(|class| {
            let n = class.rank();
            let kind = if p == 2 {
                if (0..n).any(|i| residue(&class.unimodular[i][i], 2) == 1) {
                    ConstituentType::Odd
                } else {
                    ConstituentType::Even
                }
            } else {
                let det: BigInt = (0..n).fold(BigInt::one(), |acc, i| acc * &class.unimodular[i][i]);
                ConstituentType::Residue(legendre_symbol(&det, p))
            };
            JordanConstituent {
                scale: class.scale,
                rank: n,
                kind,
            }
        })
        .collect())
}

/// Whether two nondegenerate forms share every local invariant at p computed
/// here: dimension, determinant square class, Hasse invariant and per-scale
/// Jordan data.
///
/// At odd p this is Z_p-equivalence. At p = 2 it is a set of necessary
/// conditions which the 2-adic splittings in this workspace are tested against.
pub fn has_equivalent_local_invariants(
    a: &QuadraticForm,
    b: &QuadraticForm,
    p: u64,
) -> Result<bool, DecompositionError> {
    if a.dim() != b.dim() {
        return Ok(false);
    }
    let (da, db) = (a.determinant(), b.determinant());
    if da.is_zero() || db.is_zero() {
        return Err(DecompositionError::Degenerate {
            rank: 0,
            dim: a.dim(),
        });
    }
    if !same_square_class(&da, &db, p) {
        log::debug!("determinant classes differ at p={}: {} vs {}", p, da, db);
        return Ok(false);
    }
    if hasse_invariant(a, p)? != hasse_invariant(b, p)? {
        log::debug!("Hasse invariants differ at p={}", p);
        return Ok(false);
    }
    Ok(jordan_invariants(a, p)? == jordan_invariants(b, p)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(rows: &[&[i64]]) -> QuadraticForm {
        let rows: Vec<Vec<i64>> = rows.iter().map(|r| r.to_vec()).collect();
        QuadraticForm::from_rows(&rows).unwrap()
    }

    #[test]
    fn test_check_prime() {
        assert!(check_prime(2).is_ok());
        assert!(check_prime(7).is_ok());
        assert_eq!(check_prime(9), Err(FormError::NotPrime(9)));
        assert_eq!(check_prime(1), Err(FormError::NotPrime(1)));
    }

    #[test]
    fn test_rational_diagonal_keeps_determinant_class() {
        let q = form(&[&[2, 1, 0], &[1, 4, 1], &[0, 1, 6]]);
        for p in [2u64, 3, 5, 7] {
            let diag = rational_diagonal(&q, p).unwrap();
            let product = diag.iter().fold(BigInt::one(), |acc, d| acc * d);
            assert!(
                same_square_class(&product, &q.determinant(), p),
                "diagonal product {} not in the class of det {} at p={}",
                product,
                q.determinant(),
                p
            );
        }
    }

    #[test]
    fn test_hyperbolic_and_anisotropic_planes_differ() {
        let h = form(&[&[0, 1], &[1, 0]]);
        let y = form(&[&[2, 1], &[1, 2]]);
        assert!(has_equivalent_local_invariants(&h, &h, 2).unwrap());
        assert!(!has_equivalent_local_invariants(&h, &y, 2).unwrap());
    }

    #[test]
    fn test_equivalent_under_basis_change() {
        // T = [[1, 1], [0, 1]] applied to diag(2, 6): T M T^T = [[8, 6], [6, 6]].
        let a = form(&[&[2, 0], &[0, 6]]);
        let b = form(&[&[8, 6], &[6, 6]]);
        for p in [2u64, 3, 5] {
            assert!(has_equivalent_local_invariants(&a, &b, p).unwrap(), "p={}", p);
        }
    }

    #[test]
    fn test_odd_prime_residue_class_detected() {
        // x^2 + y^2 vs x^2 + 2y^2 at p = 3: unit determinants 1 and 2 differ.
        let a = QuadraticForm::diagonal(&[1, 1]);
        let b = QuadraticForm::diagonal(&[1, 2]);
        assert!(!has_equivalent_local_invariants(&a, &b, 3).unwrap());
        let c = QuadraticForm::diagonal(&[2, 2]);
        assert!(has_equivalent_local_invariants(&a, &c, 3).unwrap());
    }

    #[test]
    fn test_jordan_invariants_two_adic_type() {
        let q = QuadraticForm::diagonal(&[1, 2]).direct_sum(&form(&[&[0, 1], &[1, 0]]));
        let inv = jordan_invariants(&q, 2).unwrap();
        assert_eq!(
            inv,
            vec![
                JordanConstituent { scale: -1, rank: 2, kind: ConstituentType::Even },
                JordanConstituent { scale: 0, rank: 1, kind: ConstituentType::Odd },
                JordanConstituent { scale: 1, rank: 1, kind: ConstituentType::Odd },
            ]
        );
    }

    #[test]
    fn test_content_valuation() {
        let q = QuadraticForm::diagonal(&[4, 12]);
        assert_eq!(content_valuation(&q, 2), Some(2));
        assert_eq!(content_valuation(&q, 3), Some(0));
    }
}
