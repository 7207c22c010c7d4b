use polars::prelude::IntoLazy;
use pwl_benchmark::{datastructures::ModelVariant, plot};
use std::path::PathBuf;
mod common;
use common::*;

#[test]
fn test_mean_of_replicas() {
    let df = plot::read_run_times(&PathBuf::from("data/test/run_times.csv")).unwrap();
    let run_times = plot::collect_run_times(plot::aggregate(df.lazy(), false)).unwrap();
    assert_eq!(run_times.len(), 4);
    let separate = run_times
        .iter()
        .find(|r| {
            r.num_partitions == 5
                && r.partition_size == 10
                && r.variant == ModelVariant::SeparateVariables
        })
        .unwrap();
    assert_float_eq(separate.time, 2.0);
}

#[test]
fn test_render_chart() {
    let df = plot::read_run_times(&PathBuf::from("data/test/run_times.csv")).unwrap();
    let run_times = plot::collect_run_times(plot::aggregate(df.lazy(), true)).unwrap();
    let out = std::env::temp_dir().join("pwl_benchmark_plot_test.svg");
    plot::render(&run_times, plot::View::Shortened, true, &out).unwrap();
    let svg = std::fs::read_to_string(&out).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("number of partitions = 5"));
}
