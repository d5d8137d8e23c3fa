//! 2-adic isotropy of ternary unit forms.
//!
//! The ternary form a x^2 + b y^2 + c z^2 with odd a, b, c represents zero over
//! Z_2 iff a x + b y + c z ≡ 0 (mod 8) has a solution with x, y, z drawn from
//! the squares {0, 1, 4} mod 8, not all even. Only 64 argument triples exist,
//! so the answers are tabulated once and shared read-only.

use std::sync::OnceLock;

/// Residues of squares of 2-adic integers modulo 8.
const SQUARES_MOD_8: [u32; 3] = [0, 1, 4];

type Table = [[[bool; 4]; 4]; 4];

static TABLE: OnceLock<Table> = OnceLock::new();

fn table() -> &'static Table {
    TABLE.get_or_init(|| {
        let mut t = [[[false; 4]; 4]; 4];
        for (i, plane) in t.iter_mut().enumerate() {
            for (j, row) in plane.iter_mut().enumerate() {
                for (k, cell) in row.iter_mut().enumerate() {
                    let odd = |idx: usize| 2 * idx as u32 + 1;
                    *cell = search(odd(i), odd(j), odd(k));
                }
            }
        }
        t
    })
}

fn search(a: u32, b: u32, c: u32) -> bool {
    for &x in &SQUARES_MOD_8 {
        for &y in &SQUARES_MOD_8 {
            for &z in &SQUARES_MOD_8 {
                let primitive = x % 2 == 1 || y % 2 == 1 || z % 2 == 1;
                if primitive && (a * x + b * y + c * z) % 8 == 0 {
                    return true;
                }
            }
        }
    }
    false
}

fn index(r: u8) -> usize {
    assert!(r % 2 == 1, "expected an odd residue, got {}", r);
    ((r % 8) / 2) as usize
}

/// Whether a x^2 + b y^2 + c z^2 represents zero 2-adically.
///
/// Arguments are read modulo 8.
///
/// # Panics
///
/// Panics if any argument is even.
pub fn represents_zero_2adically(a: u8, b: u8, c: u8) -> bool {
    table()[index(a)][index(b)][index(c)]
}
