use anyhow::Result;
use clap::ValueEnum;
use itertools::{izip, Itertools};
use plotters::prelude::{
    ChartBuilder, Color, Cross, DashedLineSeries, IntoDrawingArea, LineSeries, PathElement,
    RGBColor, SVGBackend, SeriesLabelPosition, TriangleMarker, BLACK, WHITE,
};
use polars::{lazy::dsl::GetOutput, prelude::*};
use std::path::Path;

use crate::datastructures::ModelVariant;
use crate::results::{
    BUILD_TIME, MODEL_NAME, NUM_PARTITIONS, OPTIMISE_TIME, PARTITION_SIZE,
};

pub const MODEL: &str = "model";

/// Which part of the sweep the axes cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum View {
    Shortened,
    Entire,
}

/// Mean run time of one variant at one sweep point.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedRunTime {
    pub num_partitions: i64,
    pub partition_size: i64,
    pub variant: ModelVariant,
    pub time: f64,
}

pub fn read_run_times(path: &Path) -> Result<DataFrame> {
    Ok(CsvReader::from_path(path)?.has_header(true).finish()?)
}

/// Average the optimisation time per number of partitions, partition size
/// and model variant. With `total_runtime` the build time is included.
pub fn aggregate(df: LazyFrame, total_runtime: bool) -> LazyFrame {
    let df = df.with_column(
        col(MODEL_NAME)
            .apply(
                |s: Series| {
                    Ok(s.utf8()?
                        .into_no_null_iter()
                        .map(|name| ModelVariant::detect(name).prefix())
                        .collect())
                },
                GetOutput::from_type(DataType::Utf8),
            )
            .alias(MODEL),
    );
    let df = if total_runtime {
        df.with_column((col(OPTIMISE_TIME) + col(BUILD_TIME)).alias(OPTIMISE_TIME))
    } else {
        df
    };
    let keys = [col(NUM_PARTITIONS), col(PARTITION_SIZE), col(MODEL)];
    df.select([
        col(NUM_PARTITIONS).cast(DataType::Int64),
        col(PARTITION_SIZE).cast(DataType::Int64),
        col(MODEL),
        col(OPTIMISE_TIME).cast(DataType::Float64),
    ])
    .groupby_stable(keys.clone())
    .agg([mean(OPTIMISE_TIME)])
    .sort_by_exprs(keys, vec![false; 3], false)
}

pub fn collect_run_times(df: LazyFrame) -> Result<Vec<AggregatedRunTime>> {
    let df = df.collect()?;
    let num_partitions = df.column(NUM_PARTITIONS)?.i64()?;
    let partition_size = df.column(PARTITION_SIZE)?.i64()?;
    let model = df.column(MODEL)?.utf8()?;
    let time = df.column(OPTIMISE_TIME)?.f64()?;
    Ok(izip!(
        num_partitions.into_no_null_iter(),
        partition_size.into_no_null_iter(),
        model.into_no_null_iter(),
        time.into_no_null_iter()
    )
    .map(|(num_partitions, partition_size, model, time)| AggregatedRunTime {
        num_partitions,
        partition_size,
        variant: ModelVariant::detect(model),
        time,
    })
    .collect())
}

/// Upper ends of the x and y axis.
pub fn axis_ranges(view: View, total_runtime: bool) -> (f64, f64) {
    match (total_runtime, view) {
        (true, View::Shortened) => (1000.0, 10.0),
        (true, View::Entire) => (5100.0, 60.0),
        (false, View::Shortened) => (1000.0, 1.5),
        (false, View::Entire) => (5100.0, 40.0),
    }
}

pub fn title(total_runtime: bool) -> &'static str {
    if total_runtime {
        "Comparison of total optimisation run times (including model building) for the models with individual decision variables and their augmentations via PWL cost profiles."
    } else {
        "Comparison of optimisation run times for the models with individual decision variables and their augmentations via PWL cost profiles."
    }
}

// colour blind palette (8 colours), reversed
const PALETTE: [RGBColor; 8] = [
    RGBColor(0x00, 0x00, 0x00),
    RGBColor(0xCC, 0x79, 0xA7),
    RGBColor(0xD5, 0x5E, 0x00),
    RGBColor(0x56, 0xB4, 0xE9),
    RGBColor(0x00, 0x9E, 0x73),
    RGBColor(0xF0, 0xE4, 0x42),
    RGBColor(0xE6, 0x9F, 0x00),
    RGBColor(0x00, 0x72, 0xB2),
];

pub fn render(
    run_times: &[AggregatedRunTime],
    view: View,
    total_runtime: bool,
    out: &Path,
) -> Result<()> {
    let (x_end, y_end) = axis_ranges(view, total_runtime);
    let root = SVGBackend::new(out, (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title(total_runtime), ("sans-serif", 14))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..x_end, 0f64..y_end)?;
    chart
        .configure_mesh()
        .x_desc(PARTITION_SIZE)
        .y_desc("optimisation run time (in seconds)")
        .draw()?;

    let colors = run_times
        .iter()
        .map(|r| r.num_partitions)
        .unique()
        .enumerate()
        .map(|(i, n)| (n, PALETTE[i % PALETTE.len()]))
        .collect::<std::collections::HashMap<_, _>>();
    let series = run_times
        .iter()
        .into_group_map_by(|r| (r.num_partitions, r.variant));
    for ((num_partitions, variant), mut points) in
        series.into_iter().sorted_by_key(|(key, _)| *key)
    {
        points.sort_by_key(|r| r.partition_size);
        let color = colors[&num_partitions];
        let coords = points
            .iter()
            .map(|r| (r.partition_size as f64, r.time))
            .collect_vec();
        let style = color.stroke_width(2);
        let anno = match variant {
            ModelVariant::SeparateVariables => {
                chart.draw_series(LineSeries::new(coords.clone(), style))?
            }
            ModelVariant::PwlCosts => chart.draw_series(DashedLineSeries::new(
                coords.clone(),
                8,
                4,
                style,
            ))?,
        };
        anno
            .label(format!(
                "number of partitions = {num_partitions} ({})",
                variant.prefix().replace('_', " ")
            ))
            .legend(move |(x, y)| match variant {
                ModelVariant::SeparateVariables => {
                    PathElement::new(vec![(x, y), (x + 20, y)], style)
                }
                ModelVariant::PwlCosts => {
                    PathElement::new(vec![(x, y), (x + 8, y)], style)
                }
            });
        match variant {
            ModelVariant::SeparateVariables => {
                chart.draw_series(
                    coords.iter().map(|&c| Cross::new(c, 5, color.stroke_width(2))),
                )?;
            }
            ModelVariant::PwlCosts => {
                chart.draw_series(
                    coords.iter().map(|&c| TriangleMarker::new(c, 5, color.filled())),
                )?;
            }
        }
    }
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    fn run_times_df(total: bool) -> Vec<AggregatedRunTime> {
        let df = df! {
            "model number" => [0u32, 1, 0, 1],
            "model name" => [
                "model_with_separate_variables_0",
                "model_with_separate_variables_1",
                "model_with_pwl_costs_0",
                "model_with_pwl_costs_1",
            ],
            "time taken to optimise (in seconds)" => [1.0, 3.0, 0.5, 0.5],
            "time taken to build model (in seconds)" => [1.0, 1.0, 0.25, 0.75],
            "number of partitions" => [5u32, 5, 5, 5],
            "partition size" => [10u32, 10, 10, 10],
        }
        .unwrap();
        collect_run_times(aggregate(df.lazy(), total)).unwrap()
    }

    fn time_of(run_times: &[AggregatedRunTime], variant: ModelVariant) -> f64 {
        run_times
            .iter()
            .find(|r| r.variant == variant)
            .map(|r| r.time)
            .unwrap()
    }

    #[test]
    fn test_mean_per_variant() {
        let run_times = run_times_df(false);
        assert_eq!(run_times.len(), 2);
        assert_float_eq(time_of(&run_times, ModelVariant::SeparateVariables), 2.0);
        assert_float_eq(time_of(&run_times, ModelVariant::PwlCosts), 0.5);
        assert!(run_times
            .iter()
            .all(|r| r.num_partitions == 5 && r.partition_size == 10));
    }

    #[test]
    fn test_total_runtime_includes_build_time() {
        let run_times = run_times_df(true);
        assert_float_eq(time_of(&run_times, ModelVariant::SeparateVariables), 3.0);
        assert_float_eq(time_of(&run_times, ModelVariant::PwlCosts), 1.0);
    }

    fn polylines(variant: ModelVariant, name: &str) -> usize {
        let run_times = [10, 500]
            .into_iter()
            .map(|partition_size| AggregatedRunTime {
                num_partitions: 5,
                partition_size,
                variant,
                time: 1.0,
            })
            .collect_vec();
        let out = std::env::temp_dir().join(name);
        render(&run_times, View::Shortened, false, &out).unwrap();
        std::fs::read_to_string(&out)
            .unwrap()
            .matches("<polyline")
            .count()
    }

    #[test]
    fn test_pwl_series_is_dashed() {
        let solid = polylines(
            ModelVariant::SeparateVariables,
            "pwl_benchmark_solid_line.svg",
        );
        let dashed = polylines(ModelVariant::PwlCosts, "pwl_benchmark_dashed_line.svg");
        assert!(dashed > solid + 10, "{dashed} dashes vs {solid} lines");
    }

    #[test]
    fn test_axis_ranges() {
        assert_eq!(axis_ranges(View::Shortened, false), (1000.0, 1.5));
        assert_eq!(axis_ranges(View::Entire, true), (5100.0, 60.0));
    }
}
