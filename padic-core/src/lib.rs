//! Elementary p-adic number theory shared by the quadratic-form crates.
//!
//! Everything here is exact: valuations, residue symbols and Hilbert symbols
//! are computed on `BigInt` values, with `u64` moduli for the prime.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, ToPrimitive, Zero};

/// Witnesses that make Miller-Rabin deterministic for every `u64`.
const MR_WITNESSES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// Modular exponentiation: base^exp mod m using the binary method.
pub fn mod_pow(base: u64, mut exp: u64, m: u64) -> u64 {
    if m == 1 {
        return 0;
    }
    let m = m as u128;
    let mut result = 1u128;
    let mut b = base as u128 % m;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result * b % m;
        }
        exp >>= 1;
        b = b * b % m;
    }
    result as u64
}

/// Deterministic Miller-Rabin primality test for `u64`.
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    for &p in &MR_WITNESSES {
        if n % p == 0 {
            return n == p;
        }
    }

    // Write n-1 as 2^r * d
    let mut d = n - 1;
    let mut r = 0u32;
    while d % 2 == 0 {
        d /= 2;
        r += 1;
    }

    'witness: for &a in &MR_WITNESSES {
        let mut x = mod_pow(a, d, n);
        if x == 1 || x == n - 1 {
            continue 'witness;
        }
        for _ in 0..r - 1 {
            x = mod_pow(x, 2, n);
            if x == n - 1 {
                continue 'witness;
            }
        }
        return false;
    }

    true
}

/// Least nonnegative residue of `n` modulo `m`.
pub fn residue(n: &BigInt, m: u64) -> u64 {
    n.mod_floor(&BigInt::from(m))
        .to_u64()
        .unwrap_or_default()
}

/// Split a nonzero integer as `n = p^v * u` with `p` not dividing `u`.
///
/// Returns `None` for zero, which has infinite valuation.
pub fn split_valuation(n: &BigInt, p: u64) -> Option<(u32, BigInt)> {
    if n.is_zero() {
        return None;
    }
    let p_big = BigInt::from(p);
    let mut v = 0u32;
    let mut u = n.clone();
    loop {
        let (q, r) = u.div_rem(&p_big);
        if !r.is_zero() {
            break;
        }
        u = q;
        v += 1;
    }
    Some((v, u))
}

/// p-adic valuation v_p(n). `None` for zero.
pub fn valuation(n: &BigInt, p: u64) -> Option<u32> {
    split_valuation(n, p).map(|(v, _)| v)
}

/// Jacobi symbol (a/n) for odd n > 0.
pub fn jacobi_symbol(a: u64, n: u64) -> i32 {
    debug_assert!(n % 2 == 1, "Jacobi symbol needs an odd modulus");
    if n == 1 {
        return 1;
    }
    let mut a = a % n;
    let mut n = n;
    let mut result = 1i32;

    while a != 0 {
        // Extract factors of 2
        while a % 2 == 0 {
            a /= 2;
            let n_mod8 = n % 8;
            if n_mod8 == 3 || n_mod8 == 5 {
                result = -result;
            }
        }
        // Quadratic reciprocity
        std::mem::swap(&mut a, &mut n);
        if a % 4 == 3 && n % 4 == 3 {
            result = -result;
        }
        a %= n;
    }

    if n == 1 {
        result
    } else {
        0
    }
}

/// Legendre symbol (a/p) for an odd prime p.
pub fn legendre_symbol(a: &BigInt, p: u64) -> i32 {
    jacobi_symbol(residue(a, p), p)
}

/// Kronecker symbol (a/n), extending Jacobi to all n >= 0.
pub fn kronecker_symbol(a: &BigInt, n: u64) -> i32 {
    if n == 0 {
        return if a.abs() == BigInt::from(1) { 1 } else { 0 };
    }

    let mut n_odd = n;
    let mut twos = 0u32;
    while n_odd % 2 == 0 {
        n_odd /= 2;
        twos += 1;
    }

    let mut result = 1i32;
    if twos > 0 {
        // (a/2) = 0 if a is even, 1 if a ≡ ±1 (mod 8), -1 if a ≡ ±3 (mod 8)
        let kr2 = match residue(a, 8) {
            1 | 7 => 1,
            3 | 5 => -1,
            _ => return 0,
        };
        if twos % 2 == 1 {
            result *= kr2;
        }
    }

    if n_odd == 1 {
        return result;
    }
    result * jacobi_symbol(residue(a, n_odd), n_odd)
}

/// Least positive quadratic nonresidue modulo an odd prime.
///
/// Returns `None` when `p` is not an odd prime.
pub fn least_quadratic_nonresidue(p: u64) -> Option<u64> {
    if p < 3 || !is_prime(p) {
        return None;
    }
    (2..p).find(|&a| jacobi_symbol(a, p) == -1)
}

/// Hilbert symbol (a, b)_p of two nonzero integers.
///
/// # Panics
///
/// Panics if `a` or `b` is zero.
pub fn hilbert_symbol(a: &BigInt, b: &BigInt, p: u64) -> i32 {
    let (alpha, u) = split_valuation(a, p).expect("Hilbert symbol of zero");
    let (beta, v) = split_valuation(b, p).expect("Hilbert symbol of zero");

    if p == 2 {
        let u8 = residue(&u, 8);
        let v8 = residue(&v, 8);
        let eps = |x: u64| ((x - 1) / 2) % 2;
        let omega = |x: u64| ((x * x - 1) / 8) % 2;
        let e = eps(u8) * eps(v8) + alpha as u64 * omega(v8) + beta as u64 * omega(u8);
        return if e % 2 == 0 { 1 } else { -1 };
    }

    let eps_p = ((p - 1) / 2) % 2;
    let mut result = if (alpha as u64 * beta as u64 * eps_p) % 2 == 1 {
        -1
    } else {
        1
    };
    if beta % 2 == 1 {
        result *= legendre_symbol(&u, p);
    }
    if alpha % 2 == 1 {
        result *= legendre_symbol(&v, p);
    }
    result
}

/// Whether the unit `u` (coprime to `p`) is a square in Z_p.
///
/// Odd p: `u` is a quadratic residue. p = 2: `u ≡ 1 (mod 8)`.
pub fn is_unit_square(u: &BigInt, p: u64) -> bool {
    if p == 2 {
        residue(u, 8) == 1
    } else {
        legendre_symbol(u, p) == 1
    }
}

/// Whether a nonzero integer is a square in Q_p.
pub fn is_padic_square(n: &BigInt, p: u64) -> bool {
    match split_valuation(n, p) {
        Some((v, u)) => v % 2 == 0 && is_unit_square(&u, p),
        None => false,
    }
}

/// Whether `a` and `b` lie in the same square class of Q_p^×.
pub fn same_square_class(a: &BigInt, b: &BigInt, p: u64) -> bool {
    is_padic_square(&(a * b), p)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(n: i64) -> BigInt {
        BigInt::from(n)
    }

    #[test]
    fn test_is_prime() {
        let primes: Vec<u64> = (0..60).filter(|&n| is_prime(n)).collect();
        assert_eq!(
            primes,
            vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59]
        );
        assert!(is_prime(1_000_000_007));
        assert!(!is_prime(1_000_000_007 * 3));
        // Carmichael number
        assert!(!is_prime(561));
    }

    #[test]
    fn test_valuation() {
        assert_eq!(valuation(&big(48), 2), Some(4));
        assert_eq!(valuation(&big(-45), 3), Some(2));
        assert_eq!(valuation(&big(7), 5), Some(0));
        assert_eq!(valuation(&big(0), 2), None);
        assert_eq!(split_valuation(&big(-24), 2), Some((3, big(-3))));
    }

    #[test]
    fn test_residue_negative() {
        assert_eq!(residue(&big(-1), 8), 7);
        assert_eq!(residue(&big(-9), 8), 7);
        assert_eq!(residue(&big(13), 8), 5);
    }

    #[test]
    fn test_legendre_symbol() {
        // Quadratic residues mod 7: 1, 2, 4
        let qr: Vec<u64> = (1..7).filter(|&a| legendre_symbol(&big(a as i64), 7) == 1).collect();
        assert_eq!(qr, vec![1, 2, 4]);
        assert_eq!(legendre_symbol(&big(14), 7), 0);
        assert_eq!(legendre_symbol(&big(-1), 5), 1);
        assert_eq!(legendre_symbol(&big(-1), 7), -1);
    }

    #[test]
    fn test_kronecker_symbol() {
        assert_eq!(kronecker_symbol(&big(3), 8), -1); // (3/2)^3
        assert_eq!(kronecker_symbol(&big(3), 2), -1);
        assert_eq!(kronecker_symbol(&big(5), 6), 1); // (5/2)(5/3) = (-1)(-1)
        assert_eq!(kronecker_symbol(&big(4), 2), 0);
        assert_eq!(kronecker_symbol(&big(-1), 0), 1);
    }

    #[test]
    fn test_least_quadratic_nonresidue() {
        assert_eq!(least_quadratic_nonresidue(3), Some(2));
        assert_eq!(least_quadratic_nonresidue(5), Some(2));
        assert_eq!(least_quadratic_nonresidue(7), Some(3));
        assert_eq!(least_quadratic_nonresidue(23), Some(5));
        assert_eq!(least_quadratic_nonresidue(2), None);
        assert_eq!(least_quadratic_nonresidue(9), None);
    }

    #[test]
    fn test_hilbert_symbol_odd() {
        // (p, u)_p = (u/p) for a unit u
        assert_eq!(hilbert_symbol(&big(3), &big(2), 3), -1);
        assert_eq!(hilbert_symbol(&big(3), &big(1), 3), 1);
        // (p, p)_p = (-1/p)
        assert_eq!(hilbert_symbol(&big(5), &big(5), 5), 1);
        assert_eq!(hilbert_symbol(&big(7), &big(7), 7), -1);
        // units commute to 1
        assert_eq!(hilbert_symbol(&big(2), &big(3), 5), 1);
    }

    #[test]
    fn test_hilbert_symbol_two() {
        assert_eq!(hilbert_symbol(&big(-1), &big(-1), 2), -1);
        assert_eq!(hilbert_symbol(&big(2), &big(3), 2), -1);
        assert_eq!(hilbert_symbol(&big(2), &big(7), 2), 1);
        assert_eq!(hilbert_symbol(&big(3), &big(5), 2), 1);
    }

    #[test]
    fn test_hilbert_symbol_product_formula() {
        // Product over all places is 1; the real place is -1 only for two negatives.
        let pairs = [(-3i64, -5i64), (6, -7), (-2, -11), (15, 21)];
        for (a, b) in pairs {
            let (a, b) = (big(a), big(b));
            let mut product = if a < BigInt::zero() && b < BigInt::zero() { -1 } else { 1 };
            for p in [2u64, 3, 5, 7, 11, 13] {
                product *= hilbert_symbol(&a, &b, p);
            }
            assert_eq!(product, 1, "product formula fails for ({}, {})", a, b);
        }
    }

    #[test]
    fn test_square_classes() {
        assert!(is_padic_square(&big(17), 2));
        assert!(!is_padic_square(&big(5), 2));
        assert!(is_padic_square(&big(4 * 9), 3));
        assert!(!is_padic_square(&big(3), 3));
        assert!(same_square_class(&big(2), &big(8), 5));
        assert!(same_square_class(&big(3), &big(27), 2));
        assert!(!same_square_class(&big(3), &big(7), 2));
    }
}
