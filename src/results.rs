use anyhow::{ensure, Result};
use itertools::Itertools;
use polars::prelude::*;
use std::{fs, path::Path};

pub const MODEL_NUMBER: &str = "model number";
pub const MODEL_NAME: &str = "model name";
pub const OPTIMISE_TIME: &str = "time taken to optimise (in seconds)";
pub const BUILD_TIME: &str = "time taken to build model (in seconds)";
pub const NUM_PARTITIONS: &str = "number of partitions";
pub const PARTITION_SIZE: &str = "partition size";

const ROW: &str = "row";

#[derive(Debug, Clone, PartialEq)]
pub struct BuildRecord {
    pub model_number: u32,
    pub model_name: String,
    pub build_time: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub model_number: u32,
    pub model_name: String,
    pub solve_time: f64,
    pub num_partitions: u32,
    pub partition_size: u32,
    pub objective: f64,
}

/// Build and run records of all models, in the order they were created.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunTimes {
    pub build_records: Vec<BuildRecord>,
    pub run_records: Vec<RunRecord>,
}

impl RunTimes {
    pub fn extend(&mut self, other: RunTimes) {
        self.build_records.extend(other.build_records);
        self.run_records.extend(other.run_records);
    }

    /// Number of optimized models. A model that was built but not yet
    /// optimized does not count.
    pub fn len(&self) -> usize {
        self.run_records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn build_time_df(&self) -> Result<DataFrame> {
        let records = &self.build_records;
        Ok(df! {
            MODEL_NUMBER => records.iter().map(|r| r.model_number).collect_vec(),
            MODEL_NAME => records.iter().map(|r| r.model_name.as_str()).collect_vec(),
            BUILD_TIME => records.iter().map(|r| r.build_time).collect_vec(),
        }?)
    }

    fn run_time_df(&self) -> Result<DataFrame> {
        let records = &self.run_records;
        Ok(df! {
            MODEL_NUMBER => records.iter().map(|r| r.model_number).collect_vec(),
            MODEL_NAME => records.iter().map(|r| r.model_name.as_str()).collect_vec(),
            OPTIMISE_TIME => records.iter().map(|r| r.solve_time).collect_vec(),
            NUM_PARTITIONS => records.iter().map(|r| r.num_partitions).collect_vec(),
            PARTITION_SIZE => records.iter().map(|r| r.partition_size).collect_vec(),
        }?)
    }

    /// Join build and run records row by row. Model numbers repeat between
    /// sweep points, so the row position is part of the key.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        ensure!(
            self.build_records.len() == self.run_records.len(),
            "{} build records but {} run records",
            self.build_records.len(),
            self.run_records.len()
        );
        let keys = [col(ROW), col(MODEL_NUMBER), col(MODEL_NAME)];
        let merged = self
            .run_time_df()?
            .lazy()
            .with_row_count(ROW, None)
            .join(
                self.build_time_df()?.lazy().with_row_count(ROW, None),
                keys.clone(),
                keys,
                JoinType::Inner,
            )
            .sort(ROW, Default::default())
            .select([
                col(MODEL_NUMBER),
                col(MODEL_NAME),
                col(OPTIMISE_TIME),
                col(BUILD_TIME),
                col(NUM_PARTITIONS),
                col(PARTITION_SIZE),
            ])
            .collect()?;
        ensure!(
            merged.height() == self.run_records.len(),
            "build and run records are not aligned"
        );
        Ok(merged)
    }
}

pub fn write_csv(mut df: DataFrame, path: &Path) -> Result<()> {
    let mut file = fs::File::create(path)?;
    CsvWriter::new(&mut file).has_header(true).finish(&mut df)?;
    Ok(())
}
