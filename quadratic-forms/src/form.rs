//! Integral even quadratic forms in n variables.
//!
//! A form Q(x) = x^T B x with B half-integral (integer diagonal, half-integer
//! off-diagonal) is stored through its Gram matrix M = 2B, which is an
//! integer symmetric matrix with even diagonal. Q(x) = x^T M x / 2.
//!
//! Key operations:
//! - Validation of the even Gram matrix
//! - Exact determinant (Bareiss) and adjugate
//! - Content (gcd of the polynomial coefficients)
//! - Orthogonal direct sum, scaling and leading submatrices

use crate::error::FormError;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::Rng;
use std::fmt;

/// A square integer matrix, stored row by row.
pub type Matrix = Vec<Vec<BigInt>>;

/// An integral even quadratic form, stored as its Gram matrix M = 2B.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuadraticForm {
    gram: Matrix,
}

impl QuadraticForm {
    /// Create a form from the Gram matrix M = 2B.
    ///
    /// The matrix must be square, symmetric and have an even diagonal.
    pub fn new(gram: Matrix) -> Result<Self, FormError> {
        let n = gram.len();
        for (row, entries) in gram.iter().enumerate() {
            if entries.len() != n {
                return Err(FormError::NotSquare {
                    row,
                    len: entries.len(),
                    expected: n,
                });
            }
        }
        for i in 0..n {
            if gram[i][i].is_odd() {
                return Err(FormError::OddDiagonal { index: i });
            }
            for j in (i + 1)..n {
                if gram[i][j] != gram[j][i] {
                    return Err(FormError::NotSymmetric { row: i, col: j });
                }
            }
        }
        Ok(QuadraticForm { gram })
    }

    /// Create a form from small integer rows of M = 2B.
    pub fn from_rows(rows: &[Vec<i64>]) -> Result<Self, FormError> {
        let gram = rows
            .iter()
            .map(|row| row.iter().map(|&x| BigInt::from(x)).collect())
            .collect();
        Self::new(gram)
    }

    /// The diagonal form a_1 x_1^2 + ... + a_n x_n^2, i.e. B = diag(a).
    pub fn diagonal(coeffs: &[i64]) -> Self {
        let n = coeffs.len();
        let mut gram = zero_matrix(n);
        for (i, &a) in coeffs.iter().enumerate() {
            gram[i][i] = BigInt::from(2 * a);
        }
        QuadraticForm { gram }
    }

    /// The form in zero variables.
    pub fn empty() -> Self {
        QuadraticForm { gram: Vec::new() }
    }

    /// Number of variables.
    pub fn dim(&self) -> usize {
        self.gram.len()
    }

    /// The Gram matrix M = 2B.
    pub fn gram(&self) -> &Matrix {
        &self.gram
    }

    /// Determinant of M. The determinant of B is this divided by 2^dim.
    pub fn determinant(&self) -> BigInt {
        determinant(&self.gram)
    }

    /// Whether the form has zero determinant.
    pub fn is_degenerate(&self) -> bool {
        self.determinant().is_zero()
    }

    /// Greatest common divisor of the polynomial coefficients of Q:
    /// the diagonal entries B_ii and the cross terms 2B_ij = M_ij.
    pub fn content(&self) -> BigInt {
        let n = self.dim();
        let mut g = BigInt::zero();
        for i in 0..n {
            g = g.gcd(&(&self.gram[i][i] / 2));
            for j in (i + 1)..n {
                g = g.gcd(&self.gram[i][j]);
            }
        }
        g
    }

    /// The form k * Q.
    pub fn scaled(&self, k: &BigInt) -> Self {
        let gram = self
            .gram
            .iter()
            .map(|row| row.iter().map(|x| x * k).collect())
            .collect();
        QuadraticForm { gram }
    }

    /// Orthogonal direct sum Q ⊕ R.
    pub fn direct_sum(&self, other: &QuadraticForm) -> Self {
        QuadraticForm {
            gram: block_diagonal(&self.gram, &other.gram),
        }
    }

    /// The form on the last dim - k variables (first k rows and columns dropped).
    pub fn submatrix(&self, drop_first: usize) -> Self {
        QuadraticForm {
            gram: submatrix(&self.gram, drop_first),
        }
    }
}

impl fmt::Display for QuadraticForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.gram.is_empty() {
            return write!(f, "[ ]");
        }
        for (i, row) in self.gram.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "[")?;
            for x in row {
                write!(f, " {}", x)?;
            }
            write!(f, " ]")?;
        }
        Ok(())
    }
}

/// An n x n zero matrix.
pub fn zero_matrix(n: usize) -> Matrix {
    vec![vec![BigInt::zero(); n]; n]
}

/// Drop the first `k` rows and columns.
pub fn submatrix(m: &Matrix, drop_first: usize) -> Matrix {
    m.iter()
        .skip(drop_first)
        .map(|row| row[drop_first..].to_vec())
        .collect()
}

/// Block diagonal matrix [[a, 0], [0, b]].
pub fn block_diagonal(a: &Matrix, b: &Matrix) -> Matrix {
    let (n, k) = (a.len(), b.len());
    let mut out = zero_matrix(n + k);
    for i in 0..n {
        out[i][..n].clone_from_slice(&a[i]);
    }
    for i in 0..k {
        out[n + i][n..].clone_from_slice(&b[i]);
    }
    out
}

/// Exact determinant by fraction-free Gaussian elimination (Bareiss).
pub fn determinant(m: &Matrix) -> BigInt {
    let n = m.len();
    if n == 0 {
        return BigInt::one();
    }
    let mut a = m.clone();
    let mut negate = false;
    let mut prev = BigInt::one();

    for k in 0..n - 1 {
        if a[k][k].is_zero() {
            match ((k + 1)..n).find(|&i| !a[i][k].is_zero()) {
                Some(i) => {
                    a.swap(i, k);
                    negate = !negate;
                }
                None => return BigInt::zero(),
            }
        }
        for i in (k + 1)..n {
            for j in (k + 1)..n {
                let value = (&a[i][j] * &a[k][k] - &a[i][k] * &a[k][j]) / &prev;
                a[i][j] = value;
            }
        }
        prev = a[k][k].clone();
    }

    let det = a[n - 1][n - 1].clone();
    if negate {
        -det
    } else {
        det
    }
}

/// Adjugate matrix: adj(M) * M = det(M) * I.
pub fn adjugate(m: &Matrix) -> Matrix {
    let n = m.len();
    if n == 1 {
        return vec![vec![BigInt::one()]];
    }
    let mut adj = zero_matrix(n);
    for i in 0..n {
        for j in 0..n {
            // Cofactor C_ji: delete row j and column i.
            let minor: Matrix = m
                .iter()
                .enumerate()
                .filter(|&(r, _)| r != j)
                .map(|(_, row)| {
                    row.iter()
                        .enumerate()
                        .filter(|&(c, _)| c != i)
                        .map(|(_, x)| x.clone())
                        .collect()
                })
                .collect();
            let cofactor = determinant(&minor);
            adj[i][j] = if (i + j) % 2 == 0 { cofactor } else { -cofactor };
        }
    }
    adj
}

/// Generate a random nondegenerate even form in `n` variables.
///
/// Off-diagonal entries of M are drawn from [-bound, bound] and diagonal
/// entries from 2 * [-bound, bound]; singular draws are rejected.
pub fn random_even_form(n: usize, bound: i64, rng: &mut impl Rng) -> QuadraticForm {
    assert!(bound >= 1, "entry bound must be positive");
    loop {
        let mut gram = zero_matrix(n);
        for i in 0..n {
            gram[i][i] = BigInt::from(2 * rng.gen_range(-bound..=bound));
            for j in (i + 1)..n {
                let x = BigInt::from(rng.gen_range(-bound..=bound));
                gram[i][j] = x.clone();
                gram[j][i] = x;
            }
        }
        let form = QuadraticForm { gram };
        if !form.is_degenerate() {
            return form;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rows(r: &[&[i64]]) -> Vec<Vec<i64>> {
        r.iter().map(|row| row.to_vec()).collect()
    }

    #[test]
    fn test_new_rejects_odd_diagonal() {
        let err = QuadraticForm::from_rows(&rows(&[&[1, 0], &[0, 2]])).unwrap_err();
        assert_eq!(err, FormError::OddDiagonal { index: 0 });
    }

    #[test]
    fn test_new_rejects_asymmetric() {
        let err = QuadraticForm::from_rows(&rows(&[&[2, 1], &[0, 2]])).unwrap_err();
        assert_eq!(err, FormError::NotSymmetric { row: 0, col: 1 });
    }

    #[test]
    fn test_new_rejects_ragged() {
        let err = QuadraticForm::from_rows(&rows(&[&[2, 1], &[1]])).unwrap_err();
        assert_eq!(
            err,
            FormError::NotSquare {
                row: 1,
                len: 1,
                expected: 2
            }
        );
    }

    #[test]
    fn test_determinant() {
        let m = QuadraticForm::from_rows(&rows(&[&[2, 1], &[1, 2]])).unwrap();
        assert_eq!(m.determinant(), BigInt::from(3));

        // Needs a row swap: leading entry zero
        let h = QuadraticForm::from_rows(&rows(&[&[0, 1, 0], &[1, 0, 0], &[0, 0, 4]])).unwrap();
        assert_eq!(h.determinant(), BigInt::from(-4));

        let singular = QuadraticForm::from_rows(&rows(&[&[2, 2], &[2, 2]])).unwrap();
        assert!(singular.is_degenerate());
        assert_eq!(QuadraticForm::empty().determinant(), BigInt::one());
    }

    #[test]
    fn test_adjugate_inverts() {
        let m = QuadraticForm::from_rows(&rows(&[&[4, 1, 3], &[1, 2, -1], &[3, -1, 6]])).unwrap();
        let adj = adjugate(m.gram());
        let det = m.determinant();
        for i in 0..3 {
            for j in 0..3 {
                let mut s = BigInt::zero();
                for k in 0..3 {
                    s += &adj[i][k] * &m.gram()[k][j];
                }
                let expected = if i == j { det.clone() } else { BigInt::zero() };
                assert_eq!(s, expected, "adj * M at ({}, {})", i, j);
            }
        }
    }

    #[test]
    fn test_content() {
        // 2x^2 + 6xy + 4y^2 -> M = [[4, 6], [6, 8]], content 2
        let q = QuadraticForm::from_rows(&rows(&[&[4, 6], &[6, 8]])).unwrap();
        assert_eq!(q.content(), BigInt::from(2));
        // x^2 + xy + y^2 has content 1
        let y = QuadraticForm::from_rows(&rows(&[&[2, 1], &[1, 2]])).unwrap();
        assert_eq!(y.content(), BigInt::one());
    }

    #[test]
    fn test_direct_sum_and_submatrix() {
        let a = QuadraticForm::diagonal(&[1, 3]);
        let b = QuadraticForm::from_rows(&rows(&[&[0, 1], &[1, 0]])).unwrap();
        let s = a.direct_sum(&b);
        assert_eq!(s.dim(), 4);
        assert_eq!(s.gram()[2][3], BigInt::one());
        assert_eq!(s.gram()[1][2], BigInt::zero());
        assert_eq!(s.submatrix(2), b);
        assert_eq!(QuadraticForm::empty().direct_sum(&a), a);
    }

    #[test]
    fn test_random_even_form_is_valid() {
        let mut rng = StdRng::seed_from_u64(7);
        for n in 1..6 {
            let q = random_even_form(n, 4, &mut rng);
            assert_eq!(q.dim(), n);
            assert!(!q.is_degenerate());
            assert!(QuadraticForm::new(q.gram().clone()).is_ok());
        }
    }
}
