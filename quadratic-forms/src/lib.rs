//! # quadratic-forms
//!
//! Integral even quadratic forms and their local structure at a prime.
//!
//! ## Contents
//!
//! - **Forms**: the Gram matrix M = 2B of Q(x) = x^T B x, with exact determinant,
//!   adjugate, content, direct sums and random test forms
//! - **Jordan splittings**: certified p-adic decomposition by scale into unimodular
//!   constituents, including the 2-adic even planes
//! - **Invariants**: Hasse invariant, determinant square class and per-scale Jordan
//!   data for checking local equivalence

pub mod error;
pub mod form;
pub mod invariants;
pub mod jordan;

pub use error::{DecompositionError, FormError};
pub use form::{adjugate, determinant, random_even_form, submatrix, Matrix, QuadraticForm};
pub use invariants::{
    check_prime, content_valuation, has_equivalent_local_invariants, hasse_invariant,
    jordan_invariants, rational_diagonal, ConstituentType, JordanConstituent,
};
pub use jordan::{decompose_by_scale, padic_pieces, Piece, ScaleClass};
