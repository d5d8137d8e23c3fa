//! p-adic Jordan splittings of integral quadratic forms.
//!
//! The splitting works on an integer symmetric matrix with congruence
//! transformations whose determinant is a p-adic unit, so every step stays
//! inside GL_n(Z_(p)) and the result is isometric over Z_p.
//!
//! At an odd prime every lattice diagonalizes. At p = 2 the indecomposable
//! pieces are rank-1 odd units and the two even unimodular planes:
//!
//! ```text
//! H = [[0, 1], [1, 0]]    (hyperbolic, det ≡ 7 mod 8)
//! Y = [[2, 1], [1, 2]]    (anisotropic, det ≡ 3 mod 8)
//! ```

use crate::error::DecompositionError;
use crate::form::{block_diagonal, submatrix, Matrix, QuadraticForm};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Pow, Zero};
use padic_core::valuation;

/// One indecomposable piece of a splitting, scaled by p^valuation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    /// `p^valuation * [unit]` with `unit` prime to p.
    Unit { valuation: u32, unit: BigInt },
    /// `2^valuation * H`.
    Hyperbolic { valuation: u32 },
    /// `2^valuation * Y`.
    Anisotropic { valuation: u32 },
}

impl Piece {
    pub fn valuation(&self) -> u32 {
        match self {
            Piece::Unit { valuation, .. }
            | Piece::Hyperbolic { valuation }
            | Piece::Anisotropic { valuation } => *valuation,
        }
    }

    pub fn rank(&self) -> usize {
        match self {
            Piece::Unit { .. } => 1,
            Piece::Hyperbolic { .. } | Piece::Anisotropic { .. } => 2,
        }
    }

    /// The unscaled unimodular Gram block of this piece.
    pub fn unimodular_block(&self) -> Matrix {
        let int = |x: i64| BigInt::from(x);
        match self {
            Piece::Unit { unit, .. } => vec![vec![unit.clone()]],
            Piece::Hyperbolic { .. } => vec![vec![int(0), int(1)], vec![int(1), int(0)]],
            Piece::Anisotropic { .. } => vec![vec![int(2), int(1)], vec![int(1), int(2)]],
        }
    }
}

/// A Jordan constituent: the form is isometric over Z_p to the orthogonal sum
/// of `p^scale * unimodular` over its scale classes.
///
/// `unimodular` is read as a Gram matrix of the bilinear form B, so at p = 2 a
/// constituent built from even planes can sit at scale -1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleClass {
    pub scale: i32,
    pub unimodular: Matrix,
}

impl ScaleClass {
    pub fn rank(&self) -> usize {
        self.unimodular.len()
    }
}

/// Split an integer symmetric matrix over Z_p into scaled indecomposable pieces,
/// in nondecreasing order of valuation.
///
/// `p` must be prime. A singular matrix fails with [`DecompositionError::Degenerate`].
pub fn padic_pieces(m: &Matrix, p: u64) -> Result<Vec<Piece>, DecompositionError> {
    let dim = m.len();
    let mut a = m.clone();
    let mut pieces = Vec::new();
    let mut rank = 0usize;

    while !a.is_empty() {
        let n = a.len();
        let (v, i, j) = match min_valuation(&a, p) {
            Some(found) => found,
            None => return Err(DecompositionError::Degenerate { rank, dim }),
        };

        let diagonal = (0..n).find(|&k| valuation(&a[k][k], p) == Some(v));
        if diagonal.is_none() && p == 2 {
            let piece = split_even_plane(&mut a, v, i, j);
            log::trace!("2-adic plane split off: {:?}", piece);
            rank += 2;
            pieces.push(piece);
            a = submatrix(&a, 2);
            continue;
        }

        let pivot = match diagonal {
            Some(k) => k,
            None => {
                // p odd: the diagonal of row i + row j has valuation v.
                combine(&mut a, i, &BigInt::one(), &[(j, -BigInt::one())]);
                i
            }
        };
        swap_symmetric(&mut a, 0, pivot);

        let pv: BigInt = BigInt::from(p).pow(v);
        let unit = &a[0][0] / &pv;
        for k in 1..n {
            let c = &a[k][0] / &pv;
            if !c.is_zero() {
                combine(&mut a, k, &unit, &[(0, c)]);
            }
        }
        rank += 1;
        pieces.push(Piece::Unit { valuation: v, unit });
        a = submatrix(&a, 1);
    }

    Ok(pieces)
}

/// Jordan splitting of a form by scale, ascending.
///
/// At p = 2 the splitting is of B = M/2, so each piece of M at valuation v lands at
/// scale v - 1. At odd p the splitting is of ((p+1)/2) M, which is Z_p-isometric
/// to B because (p+1)/2 ≡ 1/2 up to a unit square.
pub fn decompose_by_scale(
    form: &QuadraticForm,
    p: u64,
) -> Result<Vec<ScaleClass>, DecompositionError> {
    let (pieces, offset) = if p == 2 {
        (padic_pieces(form.gram(), 2)?, -1)
    } else {
        let half = BigInt::from((p + 1) / 2);
        (padic_pieces(form.scaled(&half).gram(), p)?, 0)
    };

    let mut classes: Vec<ScaleClass> = Vec::new();
    for piece in &pieces {
        let scale = piece.valuation() as i32 + offset;
        let block = piece.unimodular_block();
        match classes.last_mut() {
            Some(last) if last.scale == scale => {
                last.unimodular = block_diagonal(&last.unimodular, &block);
            }
            _ => classes.push(ScaleClass {
                scale,
                unimodular: block,
            }),
        }
    }
    log::debug!(
        "decomposed {}-dimensional form at p={} into {} scale classes",
        form.dim(),
        p,
        classes.len()
    );
    Ok(classes)
}

/// Smallest valuation among nonzero entries, with a position attaining it
/// (upper triangle, row-major). `None` if the matrix is zero.
fn min_valuation(a: &Matrix, p: u64) -> Option<(u32, usize, usize)> {
    let n = a.len();
    let mut best: Option<(u32, usize, usize)> = None;
    for i in 0..n {
        for j in i..n {
            if let Some(v) = valuation(&a[i][j], p) {
                if best.map_or(true, |(bv, _, _)| v < bv) {
                    best = Some((v, i, j));
                }
            }
        }
    }
    best
}

/// Split off the even plane spanned by rows i < j, where a[i][j] has the
/// minimal valuation v and no diagonal entry does. Leaves it in the top-left
/// 2x2 corner, orthogonal to everything else.
fn split_even_plane(a: &mut Matrix, v: u32, i: usize, j: usize) -> Piece {
    let n = a.len();
    swap_symmetric(a, 0, i);
    swap_symmetric(a, 1, j);

    let (x00, x01, x11) = (a[0][0].clone(), a[0][1].clone(), a[1][1].clone());
    let pv: BigInt = BigInt::from(2u32).pow(v);
    let p2v = &pv * &pv;
    // Odd, since x00 * x11 has valuation at least 2v + 2.
    let d = (&x00 * &x11 - &x01 * &x01) / &p2v;

    for k in 2..n {
        // (x, y) = (a[k][0], a[k][1]) * adj(P) / 2^(2v)
        let x = (&a[k][0] * &x11 - &a[k][1] * &x01) / &p2v;
        let y = (&a[k][1] * &x00 - &a[k][0] * &x01) / &p2v;
        combine(a, k, &d, &[(0, x), (1, y)]);
    }

    let two_pv = &pv * 2;
    let alpha = &x00 / &two_pv;
    let gamma = &x11 / &two_pv;
    if Integer::is_odd(&(alpha * gamma)) {
        Piece::Anisotropic { valuation: v }
    } else {
        Piece::Hyperbolic { valuation: v }
    }
}

/// Congruence M -> T M T^T where T is the identity except for row k,
/// which is `alpha * e_k - sum(beta_t * e_t)`.
fn combine(a: &mut Matrix, k: usize, alpha: &BigInt, terms: &[(usize, BigInt)]) {
    let n = a.len();
    let row: Vec<BigInt> = (0..n)
        .map(|c| {
            let mut x = alpha * &a[k][c];
            for (t, beta) in terms {
                x -= beta * &a[*t][c];
            }
            x
        })
        .collect();
    a[k] = row;

    for r in 0..n {
        let mut x = alpha * &a[r][k];
        for (t, beta) in terms {
            x -= beta * &a[r][*t];
        }
        a[r][k] = x;
    }
}

/// Simultaneously swap rows and columns i and j.
fn swap_symmetric(a: &mut Matrix, i: usize, j: usize) {
    if i == j {
        return;
    }
    a.swap(i, j);
    for row in a.iter_mut() {
        row.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(rows: &[&[i64]]) -> QuadraticForm {
        let rows: Vec<Vec<i64>> = rows.iter().map(|r| r.to_vec()).collect();
        QuadraticForm::from_rows(&rows).unwrap()
    }

    fn int(x: i64) -> BigInt {
        BigInt::from(x)
    }

    #[test]
    fn test_odd_prime_diagonal() {
        // B = diag(1, 9, 5, 7) at p = 3: scale 0 has rank 3, scale 2 has rank 1.
        let q = QuadraticForm::diagonal(&[1, 9, 5, 7]);
        let classes = decompose_by_scale(&q, 3).unwrap();
        assert_eq!(classes.len(), 2);
        assert_eq!((classes[0].scale, classes[0].rank()), (0, 3));
        assert_eq!((classes[1].scale, classes[1].rank()), (2, 1));
    }

    #[test]
    fn test_odd_prime_off_diagonal_pivot() {
        // 3xy: no diagonal entry, the pivot comes from row 0 + row 1.
        let q = form(&[&[0, 3], &[3, 0]]);
        let classes = decompose_by_scale(&q, 3).unwrap();
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].scale, 1);
        assert_eq!(classes[0].rank(), 2);
    }

    #[test]
    fn test_two_adic_anisotropic_plane() {
        // x^2 + xy + y^2 is the anisotropic plane at scale -1.
        let q = form(&[&[2, 1], &[1, 2]]);
        let classes = decompose_by_scale(&q, 2).unwrap();
        assert_eq!(
            classes,
            vec![ScaleClass {
                scale: -1,
                unimodular: vec![vec![int(2), int(1)], vec![int(1), int(2)]],
            }]
        );
    }

    #[test]
    fn test_two_adic_hyperbolic_plane() {
        // xy + 3y^2: det(M) = -1 - 0 ≡ 7 mod 8, so hyperbolic.
        let q = form(&[&[0, 1], &[1, 6]]);
        let pieces = padic_pieces(q.gram(), 2).unwrap();
        assert_eq!(pieces, vec![Piece::Hyperbolic { valuation: 0 }]);
    }

    #[test]
    fn test_two_adic_units() {
        let q = QuadraticForm::diagonal(&[1, 3, 2]);
        let classes = decompose_by_scale(&q, 2).unwrap();
        assert_eq!(classes.len(), 2);
        assert_eq!(classes[0].scale, 0);
        assert_eq!(classes[0].unimodular, vec![vec![int(1), int(0)], vec![int(0), int(3)]]);
        assert_eq!(classes[1].scale, 1);
        assert_eq!(classes[1].unimodular, vec![vec![int(1)]]);
    }

    #[test]
    fn test_mixed_two_adic_splitting_preserves_rank_and_det() {
        let q = form(&[&[2, 1, 0, 3], &[1, 4, 2, 0], &[0, 2, 6, 1], &[3, 0, 1, 8]]);
        let pieces = padic_pieces(q.gram(), 2).unwrap();
        let rank: usize = pieces.iter().map(Piece::rank).sum();
        assert_eq!(rank, 4);
        // Valuations come out nondecreasing.
        assert!(pieces.windows(2).all(|w| w[0].valuation() <= w[1].valuation()));
        // The 2-part of the determinant is reproduced.
        let expected = valuation(&q.determinant(), 2).unwrap();
        let got: u32 = pieces.iter().map(|pc| pc.valuation() * pc.rank() as u32).sum();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_degenerate_form() {
        let q = form(&[&[2, 2], &[2, 2]]);
        let err = decompose_by_scale(&q, 3).unwrap_err();
        assert_eq!(err, DecompositionError::Degenerate { rank: 1, dim: 2 });
    }

    #[test]
    fn test_empty_form() {
        assert!(decompose_by_scale(&QuadraticForm::empty(), 2).unwrap().is_empty());
    }
}
