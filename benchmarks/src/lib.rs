//! Fixtures shared by the splitter benchmarks.
//!
//! Forms are drawn from a fixed seed so every bench run sees the same inputs.

use quadratic_forms::{random_even_form, QuadraticForm};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Seed for all fixture forms.
pub const FIXTURE_SEED: u64 = 0x6a0d_4b1c_0002;

/// `count` random nondegenerate even forms of dimension `dim`.
pub fn fixture_forms(dim: usize, count: usize, entry_bound: i64) -> Vec<QuadraticForm> {
    let mut rng = StdRng::seed_from_u64(FIXTURE_SEED ^ dim as u64);
    (0..count)
        .map(|_| random_even_form(dim, entry_bound, &mut rng))
        .collect()
}

/// B = I_n: n odd units at scale 0, the worst case for the 2-adic unit reducer.
pub fn sum_of_squares(n: usize) -> QuadraticForm {
    QuadraticForm::diagonal(&vec![1; n])
}
