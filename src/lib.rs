//! Benchmark two formulations of the same linear program with
//! piecewise-linear costs.
//!
//! For every partition size and number of partitions of a sweep, a random
//! instance is generated and turned into two equivalent models:
//!
//! * `model_with_separate_variables`: one decision variable per partition and
//!   cost segment,
//! * `model_with_pwl_costs`: one variable per partition with a
//!   piecewise-linear objective.
//!
//! Both are built and optimized for a number of replicas, and the build and
//! solve times are written to a csv file that `plot_run_times` turns into a
//! chart.
//!
//! The default solver is a pure Rust simplex. With the `gurobi` feature the
//! models can be solved by Gurobi instead, which requires a Gurobi
//! installation (9.0 or higher) and
//! [license](http://www.gurobi.com/downloads/licenses/license-center).
//! Don't forget to set the environment variable `GUROBI_HOME` to the
//! installation path of Gurobi.
//!
//! Example
//! ```rust
//! use pwl_benchmark::datastructures::BenchmarkConfig;
//! use pwl_benchmark::harness::Benchmark;
//! use pwl_benchmark::solver::lp::LpBackend;
//! # use anyhow::Result;
//!
//! fn example() -> Result<()> {
//!     let config = BenchmarkConfig {
//!         partition_sizes: vec![5, 10],
//!         numbers_of_partitions: vec![5],
//!         num_replicas: 3,
//!         seed: Some(42),
//!         ..Default::default()
//!     };
//!     let backend = LpBackend;
//!     let report = Benchmark::new(&backend, &config)?.run()?;
//!     let df = report.run_times.to_dataframe()?;
//!     println!("{df}");
//!     Ok(())
//! }
//! ```

/// Configuration, command line arguments and small shared types.
pub mod datastructures;

/// Benchmark loop over the sweep with bounded retries on infeasible instances.
pub mod harness;

/// Random partition boundaries, cost curves and group capacities.
pub mod instance_generator;

/// The two model formulations as solver independent descriptions.
pub mod model;

/// Aggregation and rendering of the run time csv.
pub mod plot;

/// Timing records and their csv output.
pub mod results;

/// Solver backends.
pub mod solver;

#[cfg(test)]
mod test_utils;
