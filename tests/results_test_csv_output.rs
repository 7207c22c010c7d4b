use polars::prelude::*;
use pwl_benchmark::results::*;

#[test]
fn test_csv_output() {
    let run_times = RunTimes {
        build_records: vec![
            BuildRecord {
                model_number: 0,
                model_name: "model_with_separate_variables_0".into(),
                build_time: 0.25,
            },
            BuildRecord {
                model_number: 0,
                model_name: "model_with_pwl_costs_0".into(),
                build_time: 0.5,
            },
        ],
        run_records: vec![
            RunRecord {
                model_number: 0,
                model_name: "model_with_separate_variables_0".into(),
                solve_time: 1.0,
                num_partitions: 2,
                partition_size: 5,
                objective: 3.0,
            },
            RunRecord {
                model_number: 0,
                model_name: "model_with_pwl_costs_0".into(),
                solve_time: 2.0,
                num_partitions: 2,
                partition_size: 5,
                objective: 3.0,
            },
        ],
    };
    let path = std::env::temp_dir().join("pwl_benchmark_results_test.csv");
    write_csv(run_times.to_dataframe().unwrap(), &path).unwrap();

    let df = CsvReader::from_path(&path)
        .unwrap()
        .has_header(true)
        .finish()
        .unwrap();
    assert_eq!(df.shape(), (2, 6));
    assert_eq!(
        df.column(BUILD_TIME).unwrap().f64().unwrap().into_no_null_iter().collect::<Vec<_>>(),
        vec![0.25, 0.5]
    );
    assert_eq!(
        df.column(OPTIMISE_TIME).unwrap().f64().unwrap().into_no_null_iter().collect::<Vec<_>>(),
        vec![1.0, 2.0]
    );
    assert_eq!(
        df.column(MODEL_NAME).unwrap().utf8().unwrap().into_no_null_iter().collect::<Vec<_>>(),
        vec!["model_with_separate_variables_0", "model_with_pwl_costs_0"]
    );
}
