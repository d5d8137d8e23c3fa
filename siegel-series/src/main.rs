//! jordan-blocks CLI: canonical p-adic Jordan blocks of even quadratic forms.
//!
//! Usage:
//!   jordan-blocks --mode=split --gram="2,1;1,2" [--prime=2] [--json=<path>]
//!   jordan-blocks --mode=survey [--dims=3,4,5] [--primes=2,3,5,7] [--samples=50]
//!                 [--bound=5] [--seed=N] [--json=<path>]
//!
//! Modes:
//!   split   split one form given by the rows of M = 2B (rows separated by ';')
//!   survey  split random forms and check every result against its input
//!
//! Set RUST_LOG=debug for per-form logging.

use siegel_series::batch::print_summary;
use siegel_series::{
    check_recursion_hypothesis, i_invariant, jordan_blocks_from_rows, run_survey, SurveyConfig,
};
use std::collections::HashMap;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let opts = parse_args(&args);

    let mode = opts.get("mode").map(|s| s.as_str()).unwrap_or("split");

    match mode {
        "split" => run_split(&opts),
        "survey" => run_survey_mode(&opts),
        other => {
            eprintln!("Unknown mode: {other}. Use --mode=split|survey");
            std::process::exit(1);
        }
    }
}

fn run_split(opts: &HashMap<String, String>) {
    let Some(gram) = opts.get("gram") else {
        exit_with("--gram is required, e.g. --gram=\"2,1;1,2\"");
    };
    let rows = parse_gram(gram)
        .unwrap_or_else(|e| exit_with(&format!("Could not parse --gram: {e}")));
    let p = parse_u64(opts, "prime", 2).unwrap_or_else(|e| exit_with(&e));

    let blocks = match jordan_blocks_from_rows(&rows, p) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    println!("p = {p}: {blocks}");
    if p == 2 {
        let form = blocks.to_form();
        if let Some(i) = i_invariant(&form) {
            println!("i(B) = {i}");
        }
        match check_recursion_hypothesis(&blocks) {
            Ok(()) => println!("Recursion hypothesis holds."),
            Err(e) => println!("Recursion hypothesis fails: {e}"),
        }
    }
    if let Some(path) = opts.get("json") {
        write_json(&blocks, path);
    }
}

fn run_survey_mode(opts: &HashMap<String, String>) {
    let config = survey_config(opts).unwrap_or_else(|e| exit_with(&e));

    println!("Survey: dims {:?}, primes {:?}", config.dims, config.primes);
    println!("Seed: 0x{:016x}\n", config.seed);

    let report = run_survey(&config);
    print_summary(&report);
    if let Some(path) = opts.get("json") {
        write_json(&report, path);
    }
    if !report.is_clean() {
        std::process::exit(2);
    }
}

fn survey_config(opts: &HashMap<String, String>) -> Result<SurveyConfig, String> {
    let defaults = SurveyConfig::default();
    let bound = parse_u64(opts, "bound", defaults.entry_bound as u64)?;
    let entry_bound = i64::try_from(bound)
        .ok()
        .filter(|&b| b >= 1)
        .ok_or_else(|| format!("invalid value for --bound: {bound} (must be a positive i64)"))?;
    Ok(SurveyConfig {
        dims: parse_list(opts, "dims", &defaults.dims)?,
        primes: parse_list(opts, "primes", &defaults.primes)?,
        samples: parse_usize(opts, "samples", defaults.samples)?,
        entry_bound,
        seed: parse_u64(opts, "seed", defaults.seed)?,
    })
}

fn exit_with(msg: &str) -> ! {
    eprintln!("{msg}");
    std::process::exit(1);
}

// ---------------------------------------------------------------------------
// Argument parsing helpers
// ---------------------------------------------------------------------------

fn parse_args(args: &[String]) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for arg in args {
        if let Some(kv) = arg.strip_prefix("--") {
            if let Some((k, v)) = kv.split_once('=') {
                map.insert(k.to_string(), v.to_string());
            } else {
                map.insert(kv.to_string(), "true".to_string());
            }
        }
    }
    map
}

/// "2,1;1,2" -> [[2, 1], [1, 2]]
fn parse_gram(text: &str) -> Result<Vec<Vec<i64>>, std::num::ParseIntError> {
    text.split(';')
        .filter(|row| !row.trim().is_empty())
        .map(|row| {
            row.split(',')
                .map(|x| x.trim().parse::<i64>())
                .collect::<Result<Vec<i64>, _>>()
        })
        .collect()
}

fn invalid(key: &str, value: &str) -> String {
    format!("invalid value for --{key}: {value:?}")
}

fn parse_u64(opts: &HashMap<String, String>, key: &str, default: u64) -> Result<u64, String> {
    let Some(v) = opts.get(key) else {
        return Ok(default);
    };
    let parsed = match v.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => v.parse(),
    };
    parsed.map_err(|_| invalid(key, v))
}

fn parse_usize(opts: &HashMap<String, String>, key: &str, default: usize) -> Result<usize, String> {
    match opts.get(key) {
        Some(v) => v.parse().map_err(|_| invalid(key, v)),
        None => Ok(default),
    }
}

fn parse_list<T: std::str::FromStr + Clone>(
    opts: &HashMap<String, String>,
    key: &str,
    default: &[T],
) -> Result<Vec<T>, String> {
    let Some(v) = opts.get(key) else {
        return Ok(default.to_vec());
    };
    v.split(',')
        .map(|s| s.trim().parse().map_err(|_| invalid(key, s.trim())))
        .collect()
}

fn write_json<T: serde::Serialize>(value: &T, path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Warning: could not create directory {parent:?}: {e}");
                return;
            }
        }
    }
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            if let Err(e) = std::fs::write(path, json) {
                eprintln!("Warning: could not write {path}: {e}");
            } else {
                println!("\nResults written to {path}");
            }
        }
        Err(e) => eprintln!("Warning: could not serialize results: {e}"),
    }
}
