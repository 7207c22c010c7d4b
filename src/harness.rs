use anyhow::{ensure, Context, Result};
use itertools::Itertools;
use log::{debug, error, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Instant;

use crate::datastructures::*;
use crate::instance_generator::{Breakpoints, Instance};
use crate::model::build_problem;
use crate::results::{BuildRecord, RunRecord, RunTimes};
use crate::solver::{Backend, Outcome};

/// Relative difference up to which the objectives of both variants count as
/// equal.
pub const OBJECTIVE_TOLERANCE: f64 = 1e-6;

/// Outcome of a single attempt at a sweep point.
#[derive(Debug)]
pub enum Attempt {
    Feasible(RunTimes),
    /// Name of the first model found infeasible.
    Infeasible(String),
}

#[derive(Debug, Default)]
pub struct SweepReport {
    pub run_times: RunTimes,
    /// Sweep points that stayed infeasible for every attempt.
    pub exhausted: Vec<SweepPoint>,
}

pub struct Benchmark<'a, B: Backend> {
    backend: &'a B,
    config: &'a BenchmarkConfig,
    rng: ChaCha8Rng,
}

impl<'a, B: Backend> Benchmark<'a, B> {
    pub fn new(backend: &'a B, config: &'a BenchmarkConfig) -> Result<Self> {
        ensure!(config.num_replicas > 0, "at least one replica is required");
        ensure!(
            config.group_size > config.overlap_size,
            "group size ({}) has to exceed the overlap size ({})",
            config.group_size,
            config.overlap_size
        );
        ensure!(config.max_attempts > 0, "at least one attempt is required");
        // breakpoints are always `0..size`, so only an empty sequence can
        // fail here; a decreasing one is rejected by `Breakpoints::new`
        for &size in &config.partition_sizes {
            Breakpoints::from_partition_size(size)
                .with_context(|| format!("invalid partition size {size}"))?;
        }
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Ok(Self {
            backend,
            config,
            rng,
        })
    }

    /// Every partition size against every number of partitions.
    pub fn run(&mut self) -> Result<SweepReport> {
        let mut report = SweepReport::default();
        for point in self.config.sweep_points() {
            match self.run_point(point)? {
                Some(run_times) => report.run_times.extend(run_times),
                None => {
                    error!(
                        "{point}: no feasible instance after {} attempts",
                        self.config.max_attempts
                    );
                    report.exhausted.push(point);
                }
            }
        }
        Ok(report)
    }

    /// Regenerate the instance until all of its models are feasible, at most
    /// `max_attempts` times.
    pub fn run_point(&mut self, point: SweepPoint) -> Result<Option<RunTimes>> {
        let breakpoints = Breakpoints::from_partition_size(point.partition_size)?;
        for attempt in 1..=self.config.max_attempts {
            info!("{point} (attempt {attempt})");
            match self.attempt(breakpoints.clone(), point.num_partitions)? {
                Attempt::Feasible(run_times) => {
                    compare_objectives(&run_times);
                    return Ok(Some(run_times));
                }
                Attempt::Infeasible(model_name) => {
                    debug!("{model_name} is infeasible, discarding the instance");
                }
            }
        }
        Ok(None)
    }

    /// Generate one instance, build both variants for every replica and
    /// optimize them.
    ///
    /// Every build time includes the draw of the target and the group
    /// capacities. Drawing the cost curves of a replica counts towards its
    /// separate-variables model only.
    pub fn attempt(
        &mut self,
        breakpoints: Breakpoints,
        num_partitions: usize,
    ) -> Result<Attempt> {
        let start = Instant::now();
        let partition_size = breakpoints.len();
        let mut instance = Instance::generate_shared(
            breakpoints,
            &self.config.instance_settings(num_partitions),
            &mut self.rng,
        )?;
        let shared_build_time = start.elapsed().as_secs_f64();

        let mut run_times = RunTimes::default();
        let mut models = vec![];
        for variant in [ModelVariant::SeparateVariables, ModelVariant::PwlCosts] {
            for replica in 0..instance.num_replicas() {
                debug!("building model {replica} ({variant})");
                let start = Instant::now();
                // a replica's cost curves belong to its separate-variables build
                if variant == ModelVariant::SeparateVariables {
                    instance.draw_costs(
                        replica,
                        self.config.cost_increase_coeff,
                        &mut self.rng,
                    );
                }
                let problem = build_problem(variant, &instance, replica);
                let model = self.backend.build(&problem)?;
                run_times.build_records.push(BuildRecord {
                    model_number: replica as u32,
                    model_name: problem.name.clone(),
                    build_time: shared_build_time + start.elapsed().as_secs_f64(),
                });
                if self.config.output_models {
                    let path = self.backend.export(
                        &model,
                        &problem,
                        &self.config.model_dir,
                    )?;
                    debug!("wrote {}", path.display());
                }
                models.push((replica as u32, problem, model));
            }
        }

        for (model_number, problem, model) in models {
            debug!("optimising {}", problem.name);
            let start = Instant::now();
            let outcome = self.backend.optimize(&problem, model)?;
            let solve_time = start.elapsed().as_secs_f64();
            let Outcome::Optimal { objective, .. } = outcome else {
                return Ok(Attempt::Infeasible(problem.name));
            };
            run_times.run_records.push(RunRecord {
                model_number,
                model_name: problem.name,
                solve_time,
                num_partitions: num_partitions as u32,
                partition_size: partition_size as u32,
                objective,
            });
        }
        Ok(Attempt::Feasible(run_times))
    }
}

/// Log both variants of every replica side by side and warn about replicas
/// whose objectives differ.
pub fn compare_objectives(run_times: &RunTimes) -> usize {
    let by_replica = run_times
        .run_records
        .iter()
        .into_group_map_by(|record| record.model_number);
    let mut mismatches = 0;
    for (model_number, records) in by_replica.into_iter().sorted_by_key(|(n, _)| *n) {
        let (Some(separate), Some(pwl)) = (
            records.iter().find(|r| {
                ModelVariant::detect(&r.model_name) == ModelVariant::SeparateVariables
            }),
            records.iter().find(|r| {
                ModelVariant::detect(&r.model_name) == ModelVariant::PwlCosts
            }),
        ) else {
            continue;
        };
        debug!(
            "{} (objective {}) | {} (objective {})",
            separate.model_name, separate.objective, pwl.model_name, pwl.objective
        );
        debug!(
            "run times (in seconds): {} | {}",
            separate.solve_time, pwl.solve_time
        );
        let scale = separate.objective.abs().max(1.0);
        if (separate.objective - pwl.objective).abs() > OBJECTIVE_TOLERANCE * scale {
            warn!(
                "objectives of model {model_number} differ: {} vs {}",
                separate.objective, pwl.objective
            );
            mismatches += 1;
        }
    }
    mismatches
}
