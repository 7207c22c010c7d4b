use anyhow::Result;
use clap::{Parser, ValueEnum};
use clap_verbosity_flag::Verbosity;
use core::fmt;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

/// Name prefix of every model with one variable per cost segment.
pub const SEPARATE_VARIABLES: &str = "model_with_separate_variables";
/// Name prefix of every model with one augmented variable and a PWL cost.
pub const PWL_COSTS: &str = "model_with_pwl_costs";

/// The two formulations compared by the benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModelVariant {
    SeparateVariables,
    PwlCosts,
}

impl ModelVariant {
    pub fn prefix(&self) -> &'static str {
        match self {
            ModelVariant::SeparateVariables => SEPARATE_VARIABLES,
            ModelVariant::PwlCosts => PWL_COSTS,
        }
    }

    pub fn model_name(&self, replica: u32) -> String {
        format!("{}_{replica}", self.prefix())
    }

    /// Classify a model name by substring; anything that is not a
    /// separate-variables model counts as a PWL model.
    pub fn detect(model_name: &str) -> Self {
        if model_name.contains(SEPARATE_VARIABLES) {
            ModelVariant::SeparateVariables
        } else {
            ModelVariant::PwlCosts
        }
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

/// One (partition count, partition size) configuration of the sweep.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepPoint {
    pub partition_size: usize,
    pub num_partitions: usize,
}

impl fmt::Display for SweepPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "partition_size = {}, number_of_partitions = {}",
            self.partition_size, self.num_partitions
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SolverKind {
    /// Pure Rust simplex through good_lp
    #[default]
    Lp,
    /// Gurobi (needs the `gurobi` feature and a license)
    Gurobi,
}

/// Parameters of a synthetic instance that stay fixed within one sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceSettings {
    pub num_replicas: usize,
    pub num_partitions: usize,
    pub group_size: usize,
    pub overlap_size: usize,
    pub cost_increase_coeff: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BenchmarkConfig {
    #[serde(default = "default_partition_sizes")]
    pub partition_sizes: Vec<usize>,
    #[serde(default = "default_numbers_of_partitions")]
    pub numbers_of_partitions: Vec<usize>,
    #[serde(default = "default_num_replicas")]
    pub num_replicas: usize,
    #[serde(default = "default_cost_increase_coeff")]
    pub cost_increase_coeff: f64,
    #[serde(default = "default_group_size")]
    pub group_size: usize,
    #[serde(default)]
    pub overlap_size: usize,
    #[serde(default)]
    pub output_models: bool,
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,
    #[serde(default = "default_out_file")]
    pub out_file: PathBuf,
    #[serde(default)]
    pub log_to_console: bool,
    #[serde(default)]
    pub output_flag: bool,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    #[serde(default)]
    pub solver: SolverKind,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            partition_sizes: default_partition_sizes(),
            numbers_of_partitions: default_numbers_of_partitions(),
            num_replicas: default_num_replicas(),
            cost_increase_coeff: default_cost_increase_coeff(),
            group_size: default_group_size(),
            overlap_size: 0,
            output_models: false,
            model_dir: default_model_dir(),
            out_file: default_out_file(),
            log_to_console: false,
            output_flag: false,
            seed: None,
            max_attempts: default_max_attempts(),
            solver: SolverKind::default(),
        }
    }
}

impl BenchmarkConfig {
    pub fn from_cli(args: &Args) -> Result<BenchmarkConfig> {
        let mut config: BenchmarkConfig = match &args.config {
            Some(config_path) => {
                let config_str = fs::read_to_string(config_path)?;
                serde_json::from_str(&config_str)?
            }
            None => BenchmarkConfig::default(),
        };
        if let Some(partition_sizes) = &args.partition_sizes {
            config.partition_sizes = partition_sizes.to_vec();
        }
        if let Some(numbers_of_partitions) = &args.numbers_of_partitions {
            config.numbers_of_partitions = numbers_of_partitions.to_vec();
        }
        if let Some(num_replicas) = args.num_replicas {
            config.num_replicas = num_replicas;
        }
        if let Some(cost_increase_coeff) = args.cost_increase_coeff {
            config.cost_increase_coeff = cost_increase_coeff;
        }
        if let Some(seed) = args.seed {
            config.seed = Some(seed);
        }
        if let Some(max_attempts) = args.max_attempts {
            config.max_attempts = max_attempts;
        }
        if let Some(solver) = args.solver {
            config.solver = solver;
        }
        if let Some(out_file) = &args.out_file {
            config.out_file = out_file.to_path_buf();
        }
        if args.output_models {
            config.output_models = true;
        }
        Ok(config)
    }

    pub fn sweep_points(&self) -> Vec<SweepPoint> {
        self.partition_sizes
            .iter()
            .flat_map(|&partition_size| {
                self.numbers_of_partitions.iter().map(move |&num_partitions| {
                    SweepPoint {
                        partition_size,
                        num_partitions,
                    }
                })
            })
            .collect()
    }

    pub fn instance_settings(&self, num_partitions: usize) -> InstanceSettings {
        InstanceSettings {
            num_replicas: self.num_replicas,
            num_partitions,
            group_size: self.group_size,
            overlap_size: self.overlap_size,
            cost_increase_coeff: self.cost_increase_coeff,
        }
    }
}

fn default_partition_sizes() -> Vec<usize> {
    vec![5, 10, 50, 100, 250, 500, 750, 1000, 2000, 3000, 4000, 5000]
}

fn default_numbers_of_partitions() -> Vec<usize> {
    vec![5, 20, 50, 100, 250, 500]
}

fn default_num_replicas() -> usize {
    25
}

fn default_cost_increase_coeff() -> f64 {
    1.0
}

fn default_group_size() -> usize {
    2
}

fn default_model_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_out_file() -> PathBuf {
    PathBuf::from("results.csv")
}

fn default_max_attempts() -> usize {
    100
}

#[derive(Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Path to the json config
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Partition sizes to sweep over
    #[arg(short, long, value_delimiter = ' ', num_args = 0..)]
    pub partition_sizes: Option<Vec<usize>>,
    /// Numbers of partitions to sweep over
    #[arg(short, long, value_delimiter = ' ', num_args = 0..)]
    pub numbers_of_partitions: Option<Vec<usize>>,
    /// Model instances generated per sweep point
    #[arg(short = 'r', long)]
    pub num_replicas: Option<usize>,
    /// Scale of the random cost increments
    #[arg(long)]
    pub cost_increase_coeff: Option<f64>,
    /// Seed for the instance generator (random if omitted)
    #[arg(short, long)]
    pub seed: Option<u64>,
    /// How often an infeasible sweep point is regenerated before giving up
    #[arg(short, long)]
    pub max_attempts: Option<usize>,
    /// Solver used to build and optimize the models
    #[arg(long, value_enum)]
    pub solver: Option<SolverKind>,
    /// Path to the output csv
    #[arg(short, long, value_name = "FILE")]
    pub out_file: Option<PathBuf>,
    /// Write every generated model to the model directory
    #[arg(long)]
    pub output_models: bool,
    #[command(flatten)]
    pub verbosity: Verbosity,
}
