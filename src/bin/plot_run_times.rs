use anyhow::Result;
use clap::Parser;
use log::info;
use polars::prelude::IntoLazy;
use std::path::PathBuf;

use pwl_benchmark::plot::{self, View};

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Run time csv written by pwl_benchmark
    csv: PathBuf,
    /// Axis ranges to show
    #[arg(value_enum)]
    view: View,
    /// Pass `total_runtime` to include the model build time
    total_runtime: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let total_runtime = args.total_runtime.as_deref() == Some("total_runtime");
    info!("view = {:?}; total_runtime = {total_runtime}", args.view);

    let df = plot::read_run_times(&args.csv)?;
    let run_times =
        plot::collect_run_times(plot::aggregate(df.lazy(), total_runtime))?;
    let out = args.csv.with_file_name(format!(
        "{}_{}{}.svg",
        args.csv
            .file_stem()
            .map_or("run_times".into(), |s| s.to_string_lossy()),
        match args.view {
            View::Shortened => "shortened",
            View::Entire => "entire",
        },
        if total_runtime { "_total_runtime" } else { "" }
    ));
    plot::render(&run_times, args.view, total_runtime, &out)?;
    info!("wrote {}", out.display());
    Ok(())
}
