use anyhow::Result;
use clap::Parser;
use log::{error, info};
use std::fs;

use pwl_benchmark::datastructures::*;
use pwl_benchmark::harness::{Benchmark, SweepReport};
use pwl_benchmark::results;
use pwl_benchmark::solver::{lp::LpBackend, Backend};

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbosity.log_level_filter())
        .init();
    let config = match BenchmarkConfig::from_cli(&args) {
        Ok(config) => config,
        Err(err) => {
            error!("failed to read config: {err:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };
    if config.output_models {
        fs::create_dir_all(&config.model_dir)?;
    }
    let report = match config.solver {
        SolverKind::Lp => run(&LpBackend, &config)?,
        #[cfg(feature = "gurobi")]
        SolverKind::Gurobi => run(
            &pwl_benchmark::solver::gurobi::GurobiBackend {
                log_to_console: config.log_to_console,
                output_flag: config.output_flag,
            },
            &config,
        )?,
        #[cfg(not(feature = "gurobi"))]
        SolverKind::Gurobi => {
            error!("built without the gurobi feature");
            std::process::exit(exitcode::CONFIG);
        }
    };

    let df = report.run_times.to_dataframe()?;
    info!("{df}");
    results::write_csv(df, &config.out_file)?;
    info!("wrote {} models to {:?}", report.run_times.len(), config.out_file);
    if !report.exhausted.is_empty() {
        for point in &report.exhausted {
            error!("no results for {point}");
        }
        std::process::exit(exitcode::TEMPFAIL);
    }
    Ok(())
}

fn run<B: Backend>(backend: &B, config: &BenchmarkConfig) -> Result<SweepReport> {
    let mut benchmark = match Benchmark::new(backend, config) {
        Ok(benchmark) => benchmark,
        Err(err) => {
            error!("{err:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };
    benchmark.run()
}
