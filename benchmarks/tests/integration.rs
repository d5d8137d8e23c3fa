//! Sanity checks on the bench fixtures.

use benchmarks::{fixture_forms, sum_of_squares};
use quadratic_forms::has_equivalent_local_invariants;
use siegel_series::{jordan_blocks, Block};

#[test]
fn test_fixtures_are_reproducible() {
    let a = fixture_forms(5, 4, 5);
    let b = fixture_forms(5, 4, 5);
    assert_eq!(a, b);
    assert!(a.iter().all(|q| q.dim() == 5 && !q.is_degenerate()));
}

#[test]
fn test_fixtures_split_at_bench_primes() {
    for q in fixture_forms(8, 4, 5) {
        for p in [2u64, 3, 5, 7, 101] {
            let blocks = jordan_blocks(&q, p).unwrap();
            assert_eq!(blocks.dim(), 8);
        }
    }
}

#[test]
fn test_sum_of_squares_collapses() {
    // Eight odd units at scale 0 keep at most two of them.
    for n in [4, 7, 8] {
        let q = sum_of_squares(n);
        let blocks = jordan_blocks(&q, 2).unwrap();
        assert!(blocks.units_at(0) <= 2);
        assert_eq!(blocks.dim(), n);
        assert!(blocks.iter().any(|b| !matches!(b, Block::Unit { .. })));
        assert!(has_equivalent_local_invariants(&q, &blocks.to_form(), 2).unwrap());
    }
}
