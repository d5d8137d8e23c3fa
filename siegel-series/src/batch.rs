//! Parallel splitting of many forms and a randomized self-check survey.
//!
//! A survey draws random nondegenerate even forms for every (dimension, prime)
//! pair, splits them, and checks each result against its input form:
//! rank preserved, at most two units per scale at p = 2, lift locally
//! equivalent to the input, Katsurada's recursion hypothesis at p = 2.

use crate::blocks::BlockList;
use crate::error::SiegelError;
use crate::jordan_blocks;
use crate::katsurada::check_recursion_hypothesis;
use quadratic_forms::{has_equivalent_local_invariants, random_even_form, QuadraticForm};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::Serialize;

/// Split independent forms in parallel. Output order follows input order.
pub fn split_batch(forms: &[QuadraticForm], p: u64) -> Vec<Result<BlockList, SiegelError>> {
    forms.par_iter().map(|form| jordan_blocks(form, p)).collect()
}

/// Configuration for a survey run.
#[derive(Debug, Clone)]
pub struct SurveyConfig {
    /// Form dimensions to sample.
    pub dims: Vec<usize>,
    /// Primes to split at.
    pub primes: Vec<u64>,
    /// Random forms per (dimension, prime).
    pub samples: usize,
    /// Bound on the absolute value of the entries of M (diagonal: 2 * bound).
    pub entry_bound: i64,
    /// Random seed.
    pub seed: u64,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            dims: vec![3, 4, 5],
            primes: vec![2, 3, 5, 7],
            samples: 50,
            entry_bound: 5,
            seed: 0x51e6_e15e_0001,
        }
    }
}

/// Check counts for one (dimension, prime) pair.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PrimeSummary {
    pub dim: usize,
    pub prime: u64,
    pub forms: usize,
    /// Splitter returned an error.
    pub errors: usize,
    pub rank_mismatches: usize,
    /// p = 2 only: a scale carries three or more units.
    pub unit_bound_violations: usize,
    pub lift_mismatches: usize,
    /// p = 2 only.
    pub hypothesis_violations: usize,
    /// Mean number of blocks per form.
    pub mean_blocks: f64,
}

impl PrimeSummary {
    fn failures(&self) -> usize {
        self.errors
            + self.rank_mismatches
            + self.unit_bound_violations
            + self.lift_mismatches
            + self.hypothesis_violations
    }
}

/// Result of a survey across all (dimension, prime) pairs.
#[derive(Debug, Serialize)]
pub struct SurveyReport {
    pub config_samples: usize,
    pub config_entry_bound: i64,
    pub config_seed: u64,
    pub summaries: Vec<PrimeSummary>,
}

impl SurveyReport {
    /// Whether every check passed for every sampled form.
    pub fn is_clean(&self) -> bool {
        self.summaries.iter().all(|s| s.failures() == 0)
    }
}

/// Run the survey. Uses Rayon across (dimension, prime) pairs.
pub fn run_survey(config: &SurveyConfig) -> SurveyReport {
    let work: Vec<(usize, u64)> = config
        .dims
        .iter()
        .flat_map(|&d| config.primes.iter().map(move |&p| (d, p)))
        .collect();

    log::info!(
        "survey: {} (dim, prime) pairs, {} forms each",
        work.len(),
        config.samples
    );

    let summaries: Vec<PrimeSummary> = work
        .into_par_iter()
        .map(|(dim, p)| {
            let seed = config.seed
                ^ (dim as u64).wrapping_mul(0x9e37_79b9)
                ^ p.wrapping_mul(0x6c62_272e);
            survey_pair(dim, p, config.samples, config.entry_bound, seed)
        })
        .collect();

    let report = SurveyReport {
        config_samples: config.samples,
        config_entry_bound: config.entry_bound,
        config_seed: config.seed,
        summaries,
    };
    if !report.is_clean() {
        log::warn!("survey found failures");
    }
    report
}

fn survey_pair(dim: usize, p: u64, samples: usize, bound: i64, seed: u64) -> PrimeSummary {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut summary = PrimeSummary {
        dim,
        prime: p,
        ..Default::default()
    };
    let mut total_blocks = 0usize;

    for _ in 0..samples {
        let form = random_even_form(dim, bound, &mut rng);
        summary.forms += 1;

        let blocks = match jordan_blocks(&form, p) {
            Ok(b) => b,
            Err(e) => {
                log::warn!("dim={} p={}: split failed: {}\n{}", dim, p, e, form);
                summary.errors += 1;
                continue;
            }
        };
        total_blocks += blocks.len();

        if blocks.dim() != dim {
            summary.rank_mismatches += 1;
        }
        if p == 2 && blocks.max_units_per_scale() > 2 {
            summary.unit_bound_violations += 1;
        }
        match has_equivalent_local_invariants(&form, &blocks.to_form(), p) {
            Ok(true) => {}
            Ok(false) | Err(_) => {
                log::warn!("dim={} p={}: lift of {} is not equivalent", dim, p, blocks);
                summary.lift_mismatches += 1;
            }
        }
        if p == 2 {
            if let Err(e) = check_recursion_hypothesis(&blocks) {
                log::warn!("dim={}: {} for {}", dim, e, blocks);
                summary.hypothesis_violations += 1;
            }
        }
    }

    if summary.forms > 0 {
        summary.mean_blocks = total_blocks as f64 / summary.forms as f64;
    }
    log::debug!(
        "dim={} p={}: {} forms, {} failures",
        dim,
        p,
        summary.forms,
        summary.failures()
    );
    summary
}

/// Print a human-readable table of a survey report.
pub fn print_summary(report: &SurveyReport) {
    println!("\n=== Jordan block survey ===");
    println!(
        "Config: {} forms per pair, entries bounded by {}, seed 0x{:x}\n",
        report.config_samples, report.config_entry_bound, report.config_seed
    );
    println!(
        "{:>4} {:>4} {:>6} {:>7} {:>6} {:>6} {:>6} {:>6} {:>8}",
        "dim", "p", "forms", "errors", "rank", "units", "lift", "hyp", "blocks"
    );
    println!("{}", "-".repeat(64));
    for s in &report.summaries {
        println!(
            "{:>4} {:>4} {:>6} {:>7} {:>6} {:>6} {:>6} {:>6} {:>8.2}",
            s.dim,
            s.prime,
            s.forms,
            s.errors,
            s.rank_mismatches,
            s.unit_bound_violations,
            s.lift_mismatches,
            s.hypothesis_violations,
            s.mean_blocks
        );
    }
    println!(
        "\n{}",
        if report.is_clean() {
            "All checks passed."
        } else {
            "FAILURES detected."
        }
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_batch_preserves_order() {
        let forms = vec![
            QuadraticForm::diagonal(&[1, 1, 1, 1]),
            QuadraticForm::diagonal(&[3]),
            QuadraticForm::from_rows(&[vec![2, 2], vec![2, 2]]).unwrap(),
        ];
        let out = split_batch(&forms, 2);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].as_ref().unwrap().dim(), 4);
        assert_eq!(out[1].as_ref().unwrap().len(), 1);
        assert!(out[2].is_err());
    }

    #[test]
    fn test_small_survey_is_clean() {
        let config = SurveyConfig {
            dims: vec![2, 4],
            primes: vec![2, 3],
            samples: 8,
            entry_bound: 4,
            seed: 99,
        };
        let report = run_survey(&config);
        assert_eq!(report.summaries.len(), 4);
        assert!(report.summaries.iter().all(|s| s.forms == 8));
        assert!(report.is_clean(), "{:?}", report.summaries);
    }

    #[test]
    fn test_survey_report_serializes() {
        let config = SurveyConfig {
            dims: vec![3],
            primes: vec![5],
            samples: 2,
            ..Default::default()
        };
        let json = serde_json::to_string(&run_survey(&config)).unwrap();
        assert!(json.contains("\"prime\":5"));
        assert!(json.contains("\"summaries\""));
    }
}
