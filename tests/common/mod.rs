#![allow(dead_code)]
use pwl_benchmark::datastructures::{BenchmarkConfig, SolverKind};
use std::path::PathBuf;

pub fn default_config() -> BenchmarkConfig {
    BenchmarkConfig {
        partition_sizes: vec![5],
        numbers_of_partitions: vec![2],
        num_replicas: 1,
        cost_increase_coeff: 1.0,
        group_size: 2,
        overlap_size: 0,
        output_models: false,
        model_dir: PathBuf::from("."),
        out_file: PathBuf::from("results.csv"),
        log_to_console: false,
        output_flag: false,
        seed: Some(42),
        max_attempts: 100,
        solver: SolverKind::Lp,
    }
}

pub fn assert_float_eq(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() <= 1e-6 * expected.abs().max(1.0),
        "{actual} != {expected}"
    );
}
